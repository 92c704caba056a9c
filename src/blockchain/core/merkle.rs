use crate::crypto::{sha256, sha256_concat, Digest};
use crate::transcript::Course;

/// Merkle root of an ordered course list.
///
/// Leaves are `sha256(canonical course bytes)`. Each level is scanned left to
/// right and adjacent pairs are combined as `sha256(left || right)`. An
/// unpaired last node is re-hashed on its own, `sha256(node)`, rather than
/// being paired with a copy of itself. Duplicate courses are separate leaves.
///
/// An empty list yields the empty digest.
pub fn calculate_merkle_root(courses: &[Course]) -> Digest {
    let leaves: Vec<Digest> = courses.iter().map(Course::hash).collect();
    merkle_root_from_leaves(leaves)
}

fn merkle_root_from_leaves(mut level: Vec<Digest>) -> Digest {
    if level.is_empty() {
        return Digest::new();
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => sha256_concat(&[left, right]),
                [lone] => sha256(lone),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }

    level.swap_remove(0)
}
