mod mock_scripts;

pub use mock_scripts::*;
