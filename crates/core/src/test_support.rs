//! Fakes shared by the unit tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::traits::{
    BucketProbe, CloudClients, CloudProvider, CreateBucketOutcome, MockDistributionService,
    ObjectStore, UploadProgress,
};
use crate::upload::UploadItem;

#[derive(Debug)]
enum Answer {
    Text(String),
    Choice(usize),
    Confirm(bool),
}

/// Prompter replaying a fixed script of answers
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    script: RefCell<VecDeque<Answer>>,
    prompts: RefCell<Vec<String>>,
    menus: RefCell<Vec<Vec<String>>>,
    confirms: RefCell<usize>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, text: &str) -> Self {
        self.script
            .borrow_mut()
            .push_back(Answer::Text(text.to_string()));
        self
    }

    pub fn choose(self, index: usize) -> Self {
        self.script.borrow_mut().push_back(Answer::Choice(index));
        self
    }

    pub fn confirm(self, yes: bool) -> Self {
        self.script.borrow_mut().push_back(Answer::Confirm(yes));
        self
    }

    /// Every prompt shown, in order
    pub fn asked(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn menus(&self) -> Vec<Vec<String>> {
        self.menus.borrow().clone()
    }

    pub fn confirms(&self) -> usize {
        *self.confirms.borrow()
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.script
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("unexpected prompt: {prompt}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(t) => Ok(t),
            other => Err(Error::Prompt(format!("expected text for {prompt}, scripted {other:?}"))),
        }
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<usize> {
        self.menus.borrow_mut().push(items.to_vec());
        match self.next(prompt)? {
            Answer::Choice(i) => Ok(i),
            other => Err(Error::Prompt(format!("expected choice for {prompt}, scripted {other:?}"))),
        }
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        *self.confirms.borrow_mut() += 1;
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(Error::Prompt(format!("expected yes/no for {prompt}, scripted {other:?}"))),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    calls: Vec<String>,
    probes: HashMap<String, BucketProbe>,
    creates: HashMap<String, CreateBucketOutcome>,
    failing_probes: HashSet<String>,
    failing_creates: HashSet<String>,
    failing_uploads: HashSet<String>,
    uploaded: Vec<String>,
}

/// In-memory object store recording every call
///
/// Buckets are missing and creatable unless configured otherwise.
#[derive(Debug, Default, Clone)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(self, bucket: &str, probe: BucketProbe) -> Self {
        self.state
            .lock()
            .unwrap()
            .probes
            .insert(bucket.to_string(), probe);
        self
    }

    pub fn create(self, bucket: &str, outcome: CreateBucketOutcome) -> Self {
        self.state
            .lock()
            .unwrap()
            .creates
            .insert(bucket.to_string(), outcome);
        self
    }

    pub fn fail_probe(self, bucket: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_probes
            .insert(bucket.to_string());
        self
    }

    pub fn fail_create(self, bucket: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_creates
            .insert(bucket.to_string());
        self
    }

    pub fn fail_upload(self, key: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_uploads
            .insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().uploaded.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn probe_bucket(&self, bucket: &str) -> Result<BucketProbe> {
        self.record(format!("probe {bucket}"));
        let state = self.state.lock().unwrap();
        if state.failing_probes.contains(bucket) {
            return Err(Error::Provider(format!("probe failed for {bucket}")));
        }
        Ok(state
            .probes
            .get(bucket)
            .copied()
            .unwrap_or(BucketProbe::Missing))
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<CreateBucketOutcome> {
        match location_constraint {
            Some(region) => self.record(format!("create {bucket} in {region}")),
            None => self.record(format!("create {bucket}")),
        }
        let state = self.state.lock().unwrap();
        if state.failing_creates.contains(bucket) {
            return Err(Error::Provider(format!("InvalidBucketName: {bucket}")));
        }
        Ok(state
            .creates
            .get(bucket)
            .copied()
            .unwrap_or(CreateBucketOutcome::Created))
    }

    async fn allow_public_access(&self, bucket: &str) -> Result<()> {
        self.record(format!("public-access {bucket}"));
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        assert!(policy.contains(bucket));
        self.record(format!("policy {bucket}"));
        Ok(())
    }

    async fn configure_website(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> Result<()> {
        self.record(format!("website {bucket} {index_document} {error_document}"));
        Ok(())
    }

    async fn upload(&self, bucket: &str, item: &UploadItem) -> Result<()> {
        self.record(format!("upload {bucket}/{}", item.key));
        let mut state = self.state.lock().unwrap();
        if state.failing_uploads.contains(&item.key) {
            return Err(Error::Upload {
                key: item.key.clone(),
                message: "connection reset".into(),
            });
        }
        state.uploaded.push(item.key.clone());
        Ok(())
    }
}

/// Provider handing out a [`FakeStore`] and a mocked CDN
pub struct FakeProvider {
    store: FakeStore,
    cdn: Mutex<Option<MockDistributionService>>,
    connects: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeProvider {
    pub fn new(store: FakeStore, cdn: MockDistributionService) -> Self {
        Self {
            store,
            cdn: Mutex::new(Some(cdn)),
            connects: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn fail_connect(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn connects(&self) -> Vec<String> {
        self.connects.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudProvider for FakeProvider {
    type Store = FakeStore;
    type Cdn = MockDistributionService;

    async fn connect(&self, region: &str) -> Result<CloudClients<FakeStore, MockDistributionService>> {
        self.connects.lock().unwrap().push(region.to_string());
        if self.fail {
            return Err(Error::Credentials("no credentials in chain".into()));
        }
        let cdn = self
            .cdn
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::General("connect called twice".into()))?;
        Ok(CloudClients {
            store: self.store.clone(),
            cdn,
        })
    }
}

/// Progress sink recording events as strings
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl UploadProgress for RecordingProgress {
    fn begin(&self, total: usize) {
        self.events.lock().unwrap().push(format!("begin {total}"));
    }

    fn uploaded(&self, item: &UploadItem) {
        self.events
            .lock()
            .unwrap()
            .push(format!("uploaded {}", item.key));
    }

    fn finish(&self) {
        self.events.lock().unwrap().push("finish".to_string());
    }
}
