use std::ops::Deref;

use abi::Config;
use tempfile::{tempdir, TempDir};

/// A config whose data directory is a fresh temp dir, removed on drop.
pub struct TestConfig {
    config: Config,
    _dir: TempDir,
}

impl TestConfig {
    pub fn new() -> Self {
        let dir = tempdir().expect("failed to create temp data dir");
        let mut config = Config::load("fixtures/config.yml").expect("failed to load fixture");
        config.data.dir = dir.path().to_string_lossy().into_owned();
        Self { config, _dir: dir }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}
