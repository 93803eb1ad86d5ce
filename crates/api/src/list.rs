// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Lowers the flat list form into the canonical graph form.
//!
//! Each step gets a synthetic UID derived from its position: `step_0`,
//! `step_1`, … at the top level, and `<parent>_fail_<n>` for a nested
//! `onFail` chain. Steps are linked in declaration order via `onSuccess`;
//! the first top-level step is marked as the entrypoint. A nested `onFail`
//! list is itself lowered into its own chain and attached as the `onFail`
//! edge of the step that declared it.

use crate::document::{ListStep, RawOperation};
use indexmap::IndexMap;

/// Lowers a top-level list of steps into a UID -> `RawOperation` map.
pub fn lower(steps: Vec<ListStep>) -> IndexMap<String, RawOperation> {
    let mut out = IndexMap::new();
    let chain = lower_chain(steps, "step");
    for (i, (uid, mut op)) in chain.into_iter().enumerate() {
        if i == 0 {
            op.entrypoint = true;
        }
        out.insert(uid, op);
    }
    out
}

/// Lowers one chain of steps (top-level or a nested `onFail` list) into an
/// ordered sequence of `(uid, operation)` pairs, already linked to each
/// other via `onSuccess`.
fn lower_chain(steps: Vec<ListStep>, prefix: &str) -> Vec<(String, RawOperation)> {
    let uids: Vec<String> = (0..steps.len()).map(|i| format!("{prefix}_{i}")).collect();
    let mut out = Vec::new();

    for (i, step) in steps.into_iter().enumerate() {
        let uid = uids[i].clone();
        let on_success = uids.get(i + 1).cloned();

        let on_fail = step.on_fail.map(|fail_steps| {
            let fail_prefix = format!("{uid}_fail");
            let fail_chain = lower_chain(fail_steps, &fail_prefix);
            let entry_uid = fail_chain
                .first()
                .map(|(u, _)| u.clone())
                .unwrap_or_else(|| fail_prefix.clone());
            out.extend(fail_chain);
            entry_uid
        });

        out.push((
            uid,
            RawOperation {
                action: step.action,
                params: step.params,
                store: step.store,
                on_success,
                on_fail,
                entrypoint: false,
                is_async: step.is_async,
            },
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(action: &str) -> ListStep {
        ListStep {
            action: action.to_string(),
            params: json!({}),
            store: None,
            on_fail: None,
            is_async: false,
        }
    }

    #[test]
    fn chains_steps_in_order_with_first_as_entrypoint() {
        let ops = lower(vec![step("a"), step("b"), step("c")]);
        assert!(ops["step_0"].entrypoint);
        assert!(!ops["step_1"].entrypoint);
        assert_eq!(ops["step_0"].on_success.as_deref(), Some("step_1"));
        assert_eq!(ops["step_1"].on_success.as_deref(), Some("step_2"));
        assert_eq!(ops["step_2"].on_success, None);
    }

    #[test]
    fn nested_on_fail_gets_its_own_chain() {
        let mut first = step("a");
        first.on_fail = Some(vec![step("recover_1"), step("recover_2")]);
        let ops = lower(vec![first, step("b")]);

        assert_eq!(ops["step_0"].on_fail.as_deref(), Some("step_0_fail_0"));
        assert_eq!(ops["step_0_fail_0"].action, "recover_1");
        assert_eq!(ops["step_0_fail_0"].on_success.as_deref(), Some("step_0_fail_1"));
        assert_eq!(ops["step_0_fail_1"].action, "recover_2");
        assert!(!ops["step_0_fail_0"].entrypoint);
    }

    #[test]
    fn single_step_list_has_no_successor() {
        let ops = lower(vec![step("only")]);
        assert_eq!(ops.len(), 1);
        assert!(ops["step_0"].entrypoint);
        assert_eq!(ops["step_0"].on_success, None);
    }
}
