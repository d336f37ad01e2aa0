mod case_tests;
mod check_tests;
mod config_tests;
mod rubric_tests;
