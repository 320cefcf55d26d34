//! Binary hash tree over committed entries
//!
//! The commitment root is the root of a binary SHA-256 tree whose leaves
//! are tagged hashes of `(index, address, amount)`. Leaf count is padded
//! to the next power of two with zero hashes, so sibling paths have a
//! uniform depth for a given structure size. Leaf and interior hashes use
//! distinct tag bytes.

use jetdrop_primitives::{Entry, Hash256};

/// Tag byte for leaf hashes
pub const LEAF_TAG: u8 = 0x00;
/// Tag byte for interior-node hashes
pub const NODE_TAG: u8 = 0x01;

/// Hash one entry under its index
///
/// The index participates in the image, so moving an entry to a different
/// position changes the leaf even when address and amount are unchanged.
pub fn leaf_hash(index: u32, entry: &Entry) -> Hash256 {
    Hash256::sha256_tagged(
        LEAF_TAG,
        &[
            &index.to_be_bytes(),
            &[entry.address.workchain() as u8],
            entry.address.account_id(),
            &entry.amount.nano().to_be_bytes(),
        ],
    )
}

/// Hash an interior node from its ordered children
pub fn node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    Hash256::sha256_tagged(NODE_TAG, &[left.as_bytes(), right.as_bytes()])
}

/// Compute the root over a non-empty leaf list
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    let mut level = pad_to_power_of_two(leaves);
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// Collect the sibling hashes from a leaf position up to the root
pub fn sibling_path(leaves: &[Hash256], index: usize) -> Vec<Hash256> {
    let mut level = pad_to_power_of_two(leaves);
    let mut path = Vec::new();
    let mut pos = index;
    while level.len() > 1 {
        path.push(level[pos ^ 1]);
        level = level
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
        pos /= 2;
    }
    path
}

/// Recompute a root from a leaf, its index, and a sibling path
///
/// The direction at each level comes from the index bits: an even position
/// hashes as the left child, an odd one as the right child.
pub fn fold_path(leaf: Hash256, index: u32, path: &[Hash256]) -> Hash256 {
    let mut acc = leaf;
    let mut pos = index as usize;
    for sibling in path {
        acc = if pos & 1 == 0 {
            node_hash(&acc, sibling)
        } else {
            node_hash(sibling, &acc)
        };
        pos >>= 1;
    }
    acc
}

fn pad_to_power_of_two(leaves: &[Hash256]) -> Vec<Hash256> {
    let mut level = leaves.to_vec();
    let target = level.len().next_power_of_two();
    level.resize(target, Hash256::zero());
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetdrop_primitives::{Address, TokenAmount};

    fn test_entry(seed: u8) -> Entry {
        let mut id = [0u8; 32];
        id[0] = seed;
        Entry::new(Address::new(0, id), TokenAmount::from_nano(seed as u128 * 100))
    }

    fn test_leaves(n: u8) -> Vec<Hash256> {
        (0..n)
            .map(|i| leaf_hash(i as u32, &test_entry(i + 1)))
            .collect()
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaves = test_leaves(1);
        assert_eq!(merkle_root(&leaves), leaves[0]);
        assert!(sibling_path(&leaves, 0).is_empty());
    }

    #[test]
    fn test_root_is_deterministic() {
        assert_eq!(merkle_root(&test_leaves(5)), merkle_root(&test_leaves(5)));
    }

    #[test]
    fn test_leaf_order_matters() {
        let mut swapped = test_leaves(4);
        swapped.swap(1, 2);
        assert_ne!(merkle_root(&test_leaves(4)), merkle_root(&swapped));
    }

    #[test]
    fn test_non_power_of_two_padding() {
        // 3 leaves pad to 4; the pad leaf participates in the root
        let three = test_leaves(3);
        let mut four = three.clone();
        four.push(Hash256::zero());
        assert_eq!(merkle_root(&three), merkle_root(&four));
    }

    #[test]
    fn test_path_depth_is_uniform() {
        let leaves = test_leaves(5); // pads to 8, depth 3
        for i in 0..5 {
            assert_eq!(sibling_path(&leaves, i).len(), 3);
        }
    }

    #[test]
    fn test_fold_reproduces_root_for_every_index() {
        for n in [1u8, 2, 3, 4, 5, 8, 13] {
            let leaves = test_leaves(n);
            let root = merkle_root(&leaves);
            for i in 0..n as usize {
                let path = sibling_path(&leaves, i);
                assert_eq!(fold_path(leaves[i], i as u32, &path), root, "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_fold_rejects_wrong_leaf() {
        let leaves = test_leaves(6);
        let root = merkle_root(&leaves);
        let path = sibling_path(&leaves, 2);
        assert_ne!(fold_path(leaves[3], 2, &path), root);
    }

    #[test]
    fn test_leaf_includes_index() {
        let entry = test_entry(1);
        assert_ne!(leaf_hash(0, &entry), leaf_hash(1, &entry));
    }

    #[test]
    fn test_leaf_and_node_domains_differ() {
        let a = Hash256::sha256(b"a");
        let b = Hash256::sha256(b"b");
        let node = node_hash(&a, &b);
        let mut concat = Vec::new();
        concat.extend_from_slice(a.as_bytes());
        concat.extend_from_slice(b.as_bytes());
        assert_ne!(node, Hash256::sha256(&concat));
    }
}
