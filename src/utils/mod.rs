pub(crate) mod date;
pub(crate) mod interrupt;

pub(crate) use date::backup_folder_name_now;
pub(crate) use interrupt::InterruptFlag;
