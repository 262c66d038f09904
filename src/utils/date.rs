use chrono::{Local, NaiveDateTime};

use crate::consts::FOLDER_NAME_FORMAT;

/// Name of the backup folder for a run started at `at`
pub(crate) fn backup_folder_name(at: NaiveDateTime) -> String {
    at.format(FOLDER_NAME_FORMAT).to_string()
}

pub(crate) fn backup_folder_name_now() -> String {
    backup_folder_name(Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn folder_name_format() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(7, 3, 9)
            .unwrap();
        assert_eq!(backup_folder_name(at), "Backup 2025-01-05 07-03-09");
    }

    #[test]
    fn folder_name_now_has_second_granularity() {
        let name = backup_folder_name_now();
        assert!(name.starts_with("Backup "));
        // "Backup " + "YYYY-MM-DD HH-MM-SS"
        assert_eq!(name.len(), 7 + 19);
        assert!(NaiveDateTime::parse_from_str(&name, FOLDER_NAME_FORMAT).is_ok());
    }
}
