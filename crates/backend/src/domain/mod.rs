pub mod a001_data_type;
pub mod a002_data_category;
pub mod a003_data_entry;

#[cfg(test)]
mod scenario_tests;
