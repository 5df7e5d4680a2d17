use super::{Event, EventKind, EventPayload};
use ahash::AHashMap;

/// Merges redundant events of one batch and removes null ones.
///
/// Events are keyed by kind, block and workspace. A move merges into the previous
/// move of the same block only when the two were adjacent in the batch. Changes of
/// the same element and name merge. Viewport changes always merge, keeping the
/// scale the first one started from.
pub fn filter(queue: Vec<Event>) -> Vec<Event> {
    let mut merged: Vec<Event> = Vec::with_capacity(queue.len());
    // key -> (index into merged, index in the original queue of the last merged event)
    let mut seen: AHashMap<(EventKind, Option<String>, String), (usize, usize)> = AHashMap::new();

    for (i, event) in queue.into_iter().enumerate() {
        if event.is_null() {
            continue;
        }
        let key = (
            event.kind(),
            event.block_id().map(|id| id.as_str().to_string()),
            event.workspace_id.clone(),
        );
        let Some(&(slot, last_index)) = seen.get(&key) else {
            seen.insert(key, (merged.len(), i));
            merged.push(event);
            continue;
        };

        let Event {
            workspace_id,
            group,
            payload,
        } = event;
        let leftover = match (&mut merged[slot].payload, payload) {
            (
                EventPayload::BlockMove { new, reason, .. },
                EventPayload::BlockMove {
                    new: newer,
                    reason: more,
                    ..
                },
            ) if last_index + 1 == i => {
                *new = newer;
                for r in more {
                    if !reason.contains(&r) {
                        reason.push(r);
                    }
                }
                None
            }
            (
                EventPayload::BlockChange {
                    element,
                    name,
                    new_value,
                    ..
                },
                EventPayload::BlockChange {
                    element: next_element,
                    name: next_name,
                    new_value: next_value,
                    ..
                },
            ) if *element == next_element && *name == next_name => {
                *new_value = next_value;
                None
            }
            (
                EventPayload::ViewportChange {
                    view_top,
                    view_left,
                    scale,
                    ..
                },
                EventPayload::ViewportChange {
                    view_top: top,
                    view_left: left,
                    scale: next_scale,
                    ..
                },
            ) => {
                *view_top = top;
                *view_left = left;
                *scale = next_scale;
                None
            }
            (_, payload) => Some(payload),
        };

        match leftover {
            None => {
                seen.insert(key, (slot, i));
            }
            Some(payload) => {
                seen.insert(key, (merged.len(), i));
                merged.push(Event {
                    workspace_id,
                    group,
                    payload,
                });
            }
        }
    }

    merged.retain(|event| !event.is_null());
    merged
}
