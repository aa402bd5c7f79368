pub mod homebrew_execution;
pub mod selection;
pub mod update_collector;
pub mod upgrade_driver;

pub use homebrew_execution::{HomebrewAgent, SystemCommandRunner};
pub use selection::PackageSelector;
pub use update_collector::UpdateCollector;
pub use upgrade_driver::UpgradeDriver;
