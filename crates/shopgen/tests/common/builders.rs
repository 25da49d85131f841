//! Builders and fakes for creating test data programmatically.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use shopgen::batch::{BatchEvent, ProgressReporter, TaskExecutor};
use shopgen::error::TaskError;
use shopgen::taxonomy::{Category, Taxonomy};

/// Builder for creating `Taxonomy` instances.
pub struct TaxonomyBuilder {
    categories: Vec<Category>,
}

impl TaxonomyBuilder {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Add a root category.
    pub fn root(mut self, id: u64, name: &str) -> Self {
        self.categories.push(Category::new(id, name));
        self
    }

    /// Add a child category under `parent`.
    pub fn child(mut self, id: u64, name: &str, parent: u64) -> Self {
        self.categories
            .push(Category::new(id, name).with_parent(parent));
        self
    }

    pub fn build(self) -> Taxonomy {
        Taxonomy::new(self.categories)
    }

    pub fn categories(self) -> Vec<Category> {
        self.categories
    }
}

impl Default for TaxonomyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A small store taxonomy mixing English and Arabic names.
pub fn store_taxonomy() -> Taxonomy {
    TaxonomyBuilder::new()
        .root(10, "Home")
        .child(11, "Rugs", 10)
        .child(12, "Lamps", 10)
        .child(13, "سجاد", 10)
        .root(20, "Clothing")
        .child(21, "Dresses", 20)
        .child(22, "Shoes", 20)
        .root(30, "Electronics")
        .build()
}

/// What a scripted task does on a given attempt.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    /// Succeeds once the given time has passed.
    SucceedAfter(Duration),
    RateLimit,
    Fail(&'static str),
}

/// Executor whose behaviour per task and attempt is scripted up front.
///
/// Tasks without a script succeed. A script shorter than the number of
/// attempts repeats its last step.
pub struct ScriptedExecutor {
    scripts: HashMap<usize, Vec<Step>>,
    calls: Mutex<Vec<usize>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(mut self, task_id: usize, steps: Vec<Step>) -> Self {
        self.scripts.insert(task_id, steps);
        self
    }

    /// Task ids in invocation order.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, task_id: usize) -> usize {
        self.calls().iter().filter(|&&id| id == task_id).count()
    }
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor for ScriptedExecutor {
    type Payload = String;
    type Output = String;

    async fn execute(&self, task_id: usize, payload: &String) -> Result<String, TaskError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(task_id);
            calls.iter().filter(|&&id| id == task_id).count()
        };

        let step = self
            .scripts
            .get(&task_id)
            .and_then(|steps| steps.get(attempt - 1).or_else(|| steps.last()))
            .cloned()
            .unwrap_or(Step::Succeed);

        match step {
            Step::Succeed => Ok(format!("generated {}", payload)),
            Step::SucceedAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(format!("generated {}", payload))
            }
            Step::RateLimit => Err(TaskError::from_message(
                "Gemini API error 429: Resource has been exhausted",
            )),
            Step::Fail(message) => Err(TaskError::failed(message)),
        }
    }
}

/// Progress reporter that keeps every event.
pub struct RecordingProgress {
    events: Mutex<Vec<BatchEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&BatchEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl Default for RecordingProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: BatchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Payloads named `product-0`, `product-1`, ...
pub fn payloads(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("product-{}", i)).collect()
}
