pub mod db_utils;
pub mod holiday_seed;
pub mod username_lookup;
