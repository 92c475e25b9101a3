//! Shared state passed to every API handler.

use std::sync::Arc;

use crate::hub::Hub;
use crate::store::{ResultSink, ServiceSpecStore};

#[derive(Clone)]
pub struct ApiState {
    pub spec_store: Arc<dyn ServiceSpecStore>,
    pub sink: Arc<dyn ResultSink>,
    pub hub: Arc<Hub>,
}

impl ApiState {
    pub fn new(spec_store: Arc<dyn ServiceSpecStore>, sink: Arc<dyn ResultSink>, hub: Arc<Hub>) -> Self {
        Self { spec_store, sink, hub }
    }
}
