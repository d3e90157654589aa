//! Partial structural comparison between desired and observed state

use serde_json::Value;

/// Whether `observed` satisfies `desired`.
///
/// Comparison is partial: a null (or omitted) desired value matches anything,
/// so attributes left out of the desired configuration are never reported as
/// drift. Objects are compared key by key against the observed side, arrays
/// must have equal length and are aligned pairwise, and scalars compare by
/// equality.
pub fn subset_match(desired: &Value, observed: &Value) -> bool {
    match desired {
        Value::Null => true,
        Value::Object(fields) => match observed {
            Value::Object(old) => fields
                .iter()
                .all(|(k, v)| subset_match(v, old.get(k).unwrap_or(&Value::Null))),
            _ => false,
        },
        Value::Array(items) => match observed {
            Value::Array(old_items) if old_items.len() == items.len() => {
                let (new_aligned, old_aligned) = aligned(items, old_items);
                new_aligned
                    .iter()
                    .zip(old_aligned.iter())
                    .all(|(n, o)| subset_match(n, o))
            }
            _ => false,
        },
        scalar => scalar == observed,
    }
}

/// Line both arrays up for pairwise comparison. Object arrays sort both
/// sides by an `id` (falling back to `name`) member, only when the key
/// exists in both sides' first elements; object arrays without a shared key
/// keep their order, and scalar arrays sort by value.
fn aligned<'a>(desired: &'a [Value], observed: &'a [Value]) -> (Vec<&'a Value>, Vec<&'a Value>) {
    let mut new_out: Vec<&Value> = desired.iter().collect();
    let mut old_out: Vec<&Value> = observed.iter().collect();

    match (desired.first(), observed.first()) {
        (Some(Value::Object(new_first)), Some(Value::Object(old_first))) => {
            if let Some(key) = ["id", "name"]
                .iter()
                .find(|k| new_first.contains_key(**k) && old_first.contains_key(**k))
            {
                new_out.sort_by_key(|v| v.get(*key).map(|k| k.to_string()).unwrap_or_default());
                old_out.sort_by_key(|v| v.get(*key).map(|k| k.to_string()).unwrap_or_default());
            }
        }
        (Some(_), Some(_)) => {
            new_out.sort_by_key(|v| v.to_string());
            old_out.sort_by_key(|v| v.to_string());
        }
        _ => {}
    }
    (new_out, old_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omitted_attributes_are_not_compared() {
        let desired = json!({"location": "eastus"});
        let observed = json!({"location": "eastus", "id": "/subscriptions/xxx", "premiumDataDisks": "Disabled"});
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn null_desired_matches_anything() {
        let desired = json!({"location": "eastus", "description": null});
        let observed = json!({"location": "eastus", "description": "whatever"});
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn differing_scalar_is_a_mismatch() {
        let desired = json!({"properties": {"premiumDataDisks": "Enabled"}});
        let observed = json!({"properties": {"premiumDataDisks": "Disabled"}});
        assert!(!subset_match(&desired, &observed));
    }

    #[test]
    fn attribute_missing_from_observed_is_a_mismatch() {
        let desired = json!({"properties": {"branchRef": "main"}});
        let observed = json!({"properties": {}});
        assert!(!subset_match(&desired, &observed));
    }

    #[test]
    fn nested_objects_compare_partially() {
        let desired = json!({"properties": {"galleryImageReference": {"sku": "16.04-LTS"}}});
        let observed = json!({
            "properties": {
                "galleryImageReference": {
                    "sku": "16.04-LTS",
                    "publisher": "Canonical",
                    "osType": "Linux"
                },
                "provisioningState": "Succeeded"
            }
        });
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn alignment_key_must_exist_on_both_sides() {
        // observed carries provider-assigned ids the desired side lacks, so
        // `name` is the only usable alignment key
        let desired = json!([{"name": "a"}, {"name": "b"}]);
        let observed = json!([
            {"id": "2", "name": "a"},
            {"id": "1", "name": "b"}
        ]);
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn keyless_object_arrays_compare_in_order() {
        let desired = json!([
            {"labSubnetName": "a"},
            {"labSubnetName": "b"}
        ]);
        let observed = json!([
            {"labSubnetName": "a", "allowPublicIp": "Allow"},
            {"labSubnetName": "b", "allowPublicIp": "Deny"}
        ]);
        assert!(subset_match(&desired, &observed));

        let swapped = json!([
            {"labSubnetName": "b", "allowPublicIp": "Deny"},
            {"labSubnetName": "a", "allowPublicIp": "Allow"}
        ]);
        assert!(!subset_match(&desired, &swapped));
    }

    #[test]
    fn object_arrays_align_by_name() {
        let desired = json!([{"name": "b", "value": 2}, {"name": "a", "value": 1}]);
        let observed = json!([{"name": "a", "value": 1, "id": "1"}, {"name": "b", "value": 2, "id": "2"}]);
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn array_length_mismatch_is_a_mismatch() {
        let desired = json!(["a", "b"]);
        let observed = json!(["a"]);
        assert!(!subset_match(&desired, &observed));

        let desired = json!([]);
        let observed = json!([]);
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn scalar_arrays_compare_as_sorted_multisets() {
        let desired = json!(["Monday", "Friday"]);
        let observed = json!(["Friday", "Monday"]);
        assert!(subset_match(&desired, &observed));
    }

    #[test]
    fn scalar_vs_observed_null_is_a_mismatch() {
        let desired = json!({"status": "Enabled"});
        let observed = json!({"status": null});
        assert!(!subset_match(&desired, &observed));
    }
}
