//! Contract tests for the apply state machine against an in-memory store.

use async_trait::async_trait;
use reconcile::{ChangeResult, Desired, Reconciler, ResourceKey, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

struct MemoryReconciler {
    store: Mutex<HashMap<ResourceKey, Value>>,
    mutations: Mutex<u32>,
}

impl MemoryReconciler {
    fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            mutations: Mutex::new(0),
        }
    }

    fn mutation_count(&self) -> u32 {
        *self.mutations.lock().unwrap()
    }
}

fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (k, v) in patch {
                merge(base.entry(k.clone()).or_insert(Value::Null), v);
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

#[async_trait]
impl Reconciler for MemoryReconciler {
    type Desired = Value;
    type Observed = Value;

    async fn get(&self, key: &ResourceKey) -> Result<Option<Value>> {
        Ok(self.store.lock().unwrap().get(key).cloned())
    }

    async fn create_or_update(&self, key: &ResourceKey, desired: &Value) -> Result<Value> {
        *self.mutations.lock().unwrap() += 1;
        let mut store = self.store.lock().unwrap();
        let entry = store
            .entry(key.clone())
            .or_insert_with(|| json!({"id": format!("/fake/{}", key)}));
        merge(entry, desired);
        Ok(entry.clone())
    }

    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        *self.mutations.lock().unwrap() += 1;
        self.store.lock().unwrap().remove(key);
        Ok(())
    }
}

fn key() -> ResourceKey {
    ResourceKey::new("rg", "resource-0")
}

async fn apply(
    reconciler: &MemoryReconciler,
    desired: Desired<Value>,
    dry_run: bool,
) -> ChangeResult<Value> {
    reconciler.apply(&key(), &desired, dry_run).await.unwrap()
}

#[tokio::test]
async fn first_apply_of_a_new_key_reports_changed() {
    let reconciler = MemoryReconciler::new();
    let result = apply(&reconciler, Desired::Present(json!({"size": "small"})), false).await;

    assert!(result.changed);
    let resource = result.resource.unwrap();
    assert_eq!(resource["size"], "small");
    assert!(resource["id"].is_string());
}

#[tokio::test]
async fn second_apply_of_identical_state_is_a_no_op() {
    let reconciler = MemoryReconciler::new();
    apply(&reconciler, Desired::Present(json!({"size": "small"})), false).await;

    let result = apply(&reconciler, Desired::Present(json!({"size": "small"})), false).await;
    assert!(!result.changed);
    assert_eq!(reconciler.mutation_count(), 1);
}

#[tokio::test]
async fn dry_run_create_does_not_mutate_and_still_reports_changed() {
    let reconciler = MemoryReconciler::new();

    let dry = apply(&reconciler, Desired::Present(json!({"size": "small"})), true).await;
    assert!(dry.changed);
    assert!(dry.resource.is_none());
    assert_eq!(reconciler.mutation_count(), 0);

    // the real apply must still see an absent resource and create it
    let real = apply(&reconciler, Desired::Present(json!({"size": "small"})), false).await;
    assert!(real.changed);
    assert_eq!(reconciler.mutation_count(), 1);
}

#[tokio::test]
async fn delete_of_nonexistent_key_is_a_no_op() {
    let reconciler = MemoryReconciler::new();
    let result = apply(&reconciler, Desired::Absent, false).await;

    assert!(!result.changed);
    assert!(result.resource.is_none());
    assert_eq!(reconciler.mutation_count(), 0);
}

#[tokio::test]
async fn delete_of_existing_key_reports_changed_once() {
    let reconciler = MemoryReconciler::new();
    apply(&reconciler, Desired::Present(json!({"size": "small"})), false).await;

    let first = apply(&reconciler, Desired::Absent, false).await;
    assert!(first.changed);

    let second = apply(&reconciler, Desired::Absent, false).await;
    assert!(!second.changed);
}

#[tokio::test]
async fn dry_run_delete_leaves_the_resource_present() {
    let reconciler = MemoryReconciler::new();
    apply(&reconciler, Desired::Present(json!({"size": "small"})), false).await;

    let dry = apply(&reconciler, Desired::Absent, true).await;
    assert!(dry.changed);
    assert!(reconciler.get(&key()).await.unwrap().is_some());
}

#[tokio::test]
async fn partial_update_changes_one_attribute_and_preserves_the_rest() {
    let reconciler = MemoryReconciler::new();
    apply(
        &reconciler,
        Desired::Present(json!({"size": "small", "description": "initial", "flag": false})),
        false,
    )
    .await;

    // toggle only the flag; description is omitted from the desired state
    let result = apply(&reconciler, Desired::Present(json!({"flag": true})), false).await;
    assert!(result.changed);

    let observed = reconciler.get(&key()).await.unwrap().unwrap();
    assert_eq!(observed["flag"], true);
    assert_eq!(observed["description"], "initial");
    assert_eq!(observed["size"], "small");

    // reapplying the toggle is then a no-op
    let again = apply(&reconciler, Desired::Present(json!({"flag": true})), false).await;
    assert!(!again.changed);
}

#[tokio::test]
async fn dry_run_update_reports_changed_without_writing() {
    let reconciler = MemoryReconciler::new();
    apply(&reconciler, Desired::Present(json!({"flag": false})), false).await;
    let writes_before = reconciler.mutation_count();

    let dry = apply(&reconciler, Desired::Present(json!({"flag": true})), true).await;
    assert!(dry.changed);
    // dry-run update surfaces the current (unmodified) observed state
    assert_eq!(dry.resource.unwrap()["flag"], false);
    assert_eq!(reconciler.mutation_count(), writes_before);
}
