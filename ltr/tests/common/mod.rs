pub mod assertions;
pub mod env;
pub mod logging;

pub use assertions::{assert_contains, assert_path_exists};
pub use env::TestEnv;
pub use logging::init_test_logging;
