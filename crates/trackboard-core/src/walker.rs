//! Artifact tree walker: flattens a run's remote artifact tree into file paths.

use tracing::debug;

use crate::client::TrackingService;
use crate::error::{DashError, Result};
use crate::models::ArtifactNode;

struct Frame {
    entries: std::vec::IntoIter<ArtifactNode>,
    depth: usize,
}

/// Lists every file reachable under `start`, depth-first, expanding
/// directories in the order the service returns them.
///
/// The traversal keeps an explicit stack instead of recursing. The listing of
/// `start` is depth 0; a directory found at depth `d` is listed at depth
/// `d + 1`, and listing beyond `max_depth` fails with
/// [`DashError::MaxDepthExceeded`]. Nothing is memoized, so every call
/// re-queries the whole subtree.
pub fn walk_artifacts(
    service: &dyn TrackingService,
    run_id: &str,
    start: &str,
    max_depth: usize,
) -> Result<Vec<String>> {
    let mut files = vec![];
    let mut stack = vec![Frame {
        entries: service.list_artifacts(run_id, start)?.into_iter(),
        depth: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let depth = frame.depth;
        match frame.entries.next() {
            Some(node) if node.is_directory => {
                if depth + 1 > max_depth {
                    return Err(DashError::MaxDepthExceeded {
                        path: node.path,
                        max_depth,
                    });
                }
                let children = service.list_artifacts(run_id, &node.path)?;
                stack.push(Frame {
                    entries: children.into_iter(),
                    depth: depth + 1,
                });
            }
            Some(node) => files.push(node.path),
            None => {
                stack.pop();
            }
        }
    }

    debug!(run_id, start, count = files.len(), "walked artifact tree");
    Ok(files)
}
