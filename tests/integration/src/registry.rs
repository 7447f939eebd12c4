//! In-memory artifact registry shared by the pipeline tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use plugmerge_core::{Error, ProjectConfig, Project, Result, Transport};

pub const BASE_URL: &str = "https://registry.test/d/plugins";

/// Serves zip artifacts by `vendor/name/version` and records every request.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    artifacts: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl MemoryRegistry {
    pub fn publish(&self, vendor: &str, name: &str, version: &str, archive: Vec<u8>) {
        self.artifacts
            .borrow_mut()
            .insert(format!("{BASE_URL}/{vendor}/{name}/{version}.zip"), archive);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of downloads of one artifact.
    pub fn downloads(&self, vendor: &str, name: &str, version: &str) -> usize {
        let wanted = format!("GET {BASE_URL}/{vendor}/{name}/{version}.zip");
        self.requests.borrow().iter().filter(|r| **r == wanted).count()
    }

    fn lookup(&self, method: &str, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(format!("{method} {url}"));
        self.artifacts
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

impl Transport for MemoryRegistry {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.lookup("GET", url)
    }

    fn head(&self, url: &str) -> Result<()> {
        self.lookup("HEAD", url).map(|_| ())
    }
}

/// A project rooted at `root` talking to `registry`.
pub fn project(root: &Path, registry: &MemoryRegistry) -> Project {
    let mut config = ProjectConfig::default();
    config.registry.base_url = BASE_URL.to_string();
    Project::with_transport(root, config, Box::new(registry.clone()))
}
