//! # shardchain-trie
//!
//! An in-memory Merkle-Patricia trie used to compute per-block roots
//! (`txRoot`, `microBlockTxnRoot`, `microBlockDeltaRoot`): every entry is
//! keyed by its RLP-encoded sequential index and its value is a
//! fixed-length hash, mirroring the index-keyed transaction trie. Unlike
//! the original on-disk state trie, this trie is rebuilt per block and
//! discarded once its root is read — there is no persistent backing store
//! or Merkle proof support here, since those only matter for the state
//! trie, which is out of scope.
//!
//! Node hashing uses SHA-256 (via `shardchain-crypto`) rather than
//! Keccak-256, for consistency with the rest of the header-hashing
//! pipeline. Child references are always the hash of the encoded child,
//! never an inlined short encoding: a deliberate simplification of the
//! classic "embed if RLP(child) < 32 bytes" rule, documented as such
//! rather than claimed to be byte-compatible with any existing trie
//! implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

use rlp::RlpStream;
use shardchain_crypto::sha256;
use shardchain_primitives::H256;

#[derive(Clone, Debug)]
enum Node {
    Empty,
    Leaf(Vec<u8>, Vec<u8>),
    Extension(Vec<u8>, Box<Node>),
    Branch(Box<[Node; 16]>, Option<Vec<u8>>),
}

/// An in-memory Merkle-Patricia trie mapping byte-string keys to byte-string
/// values, rooted at a single SHA-256 digest.
#[derive(Clone, Debug)]
pub struct MerkleTrie {
    root: Node,
}

impl Default for MerkleTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl MerkleTrie {
    /// An empty trie.
    pub fn new() -> Self {
        MerkleTrie { root: Node::Empty }
    }

    /// Insert `value` at `key`, overwriting any existing value at that key.
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) {
        let path = to_nibbles(key);
        let root = std::mem::replace(&mut self.root, Node::Empty);
        self.root = insert(root, &path, value);
    }

    /// The trie's root hash. The empty trie hashes to `SHA-256(0x80)`, the
    /// hash of the RLP encoding of an empty string.
    pub fn root_hash(&self) -> H256 {
        hash_node(&self.root)
    }
}

/// Compute the root of a trie whose entries are `(RLP(index), hash)` for
/// `index` in `0..hashes.len()`, matching the index-keyed transaction trie
/// construction used for `txRoot` and the microblock roots.
pub fn compute_indexed_root<'a>(hashes: impl IntoIterator<Item = &'a H256>) -> H256 {
    let mut trie = MerkleTrie::new();
    for (index, hash) in hashes.into_iter().enumerate() {
        let key = shardchain_rlp_key(index as u64);
        trie.insert(&key, hash.as_bytes().to_vec());
    }
    trie.root_hash()
}

fn shardchain_rlp_key(index: u64) -> Vec<u8> {
    if index == 0 {
        return vec![0x80];
    }
    let bytes = index.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    let trimmed = &bytes[start..];
    if trimmed.len() == 1 && trimmed[0] < 0x80 {
        return trimmed.to_vec();
    }
    let mut out = vec![0x80 + trimmed.len() as u8];
    out.extend_from_slice(trimmed);
    out
}

fn to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for b in bytes {
        nibbles.push(b >> 4);
        nibbles.push(b & 0x0f);
    }
    nibbles
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn insert(node: Node, path: &[u8], value: Vec<u8>) -> Node {
    match node {
        Node::Empty => Node::Leaf(path.to_vec(), value),

        Node::Leaf(leaf_path, leaf_value) => {
            let cp = common_prefix_len(&leaf_path, path);
            if cp == leaf_path.len() && cp == path.len() {
                return Node::Leaf(leaf_path, value);
            }
            let mut children = empty_children();
            let mut branch_value = None;

            if cp == leaf_path.len() {
                branch_value = Some(leaf_value);
            } else {
                let idx = leaf_path[cp] as usize;
                children[idx] = Node::Leaf(leaf_path[cp + 1..].to_vec(), leaf_value);
            }
            if cp == path.len() {
                branch_value = Some(value);
            } else {
                let idx = path[cp] as usize;
                children[idx] = Node::Leaf(path[cp + 1..].to_vec(), value);
            }

            wrap_branch(Box::new(children), branch_value, &path[..cp])
        }

        Node::Extension(ext_path, child) => {
            let cp = common_prefix_len(&ext_path, path);
            if cp == ext_path.len() {
                let new_child = insert(*child, &path[cp..], value);
                return Node::Extension(ext_path, Box::new(new_child));
            }

            let mut children = empty_children();
            let ext_idx = ext_path[cp] as usize;
            let ext_rest = ext_path[cp + 1..].to_vec();
            children[ext_idx] = if ext_rest.is_empty() {
                *child
            } else {
                Node::Extension(ext_rest, child)
            };

            let mut branch_value = None;
            if cp == path.len() {
                branch_value = Some(value);
            } else {
                let idx = path[cp] as usize;
                children[idx] = Node::Leaf(path[cp + 1..].to_vec(), value);
            }

            wrap_branch(Box::new(children), branch_value, &path[..cp])
        }

        Node::Branch(mut children, branch_value) => {
            if path.is_empty() {
                Node::Branch(children, Some(value))
            } else {
                let idx = path[0] as usize;
                let existing = std::mem::replace(&mut children[idx], Node::Empty);
                children[idx] = insert(existing, &path[1..], value);
                Node::Branch(children, branch_value)
            }
        }
    }
}

fn empty_children() -> [Node; 16] {
    std::array::from_fn(|_| Node::Empty)
}

fn wrap_branch(children: Box<[Node; 16]>, value: Option<Vec<u8>>, prefix: &[u8]) -> Node {
    let branch = Node::Branch(children, value);
    if prefix.is_empty() {
        branch
    } else {
        Node::Extension(prefix.to_vec(), Box::new(branch))
    }
}

fn hex_prefix(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let odd = nibbles.len() % 2;
    let flag = if is_leaf { 2 } else { 0 } + odd as u8;
    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    let mut rest = nibbles;
    if odd == 1 {
        out.push(flag * 16 + nibbles[0]);
        rest = &nibbles[1..];
    } else {
        out.push(flag * 16);
    }
    for pair in rest.chunks_exact(2) {
        out.push(pair[0] * 16 + pair[1]);
    }
    out
}

fn child_ref(node: &Node) -> Vec<u8> {
    match node {
        Node::Empty => Vec::new(),
        other => hash_node(other).as_bytes().to_vec(),
    }
}

fn encode_node(node: &Node) -> Vec<u8> {
    match node {
        Node::Empty => vec![0x80],
        Node::Leaf(path, value) => {
            let mut s = RlpStream::new_list(2);
            s.append(&hex_prefix(path, true));
            s.append(value);
            s.out().to_vec()
        }
        Node::Extension(path, child) => {
            let mut s = RlpStream::new_list(2);
            s.append(&hex_prefix(path, false));
            s.append(&child_ref(child));
            s.out().to_vec()
        }
        Node::Branch(children, value) => {
            let mut s = RlpStream::new_list(17);
            for child in children.iter() {
                s.append(&child_ref(child));
            }
            match value {
                Some(v) => {
                    s.append(v);
                }
                None => {
                    s.append_empty_data();
                }
            }
            s.out().to_vec()
        }
    }
}

fn hash_node(node: &Node) -> H256 {
    sha256(&encode_node(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trie_has_stable_root() {
        let trie = MerkleTrie::new();
        let expected = sha256(&[0x80]);
        assert_eq!(trie.root_hash(), expected);
    }

    #[test]
    fn insert_is_order_independent() {
        let mut a = MerkleTrie::new();
        a.insert(b"alpha", vec![1]);
        a.insert(b"beta", vec![2]);

        let mut b = MerkleTrie::new();
        b.insert(b"beta", vec![2]);
        b.insert(b"alpha", vec![1]);

        assert_eq!(a.root_hash(), b.root_hash());
    }

    #[test]
    fn overwriting_a_key_changes_only_that_value() {
        let mut trie = MerkleTrie::new();
        trie.insert(b"k", vec![1]);
        let first_root = trie.root_hash();
        trie.insert(b"k", vec![2]);
        let second_root = trie.root_hash();
        assert_ne!(first_root, second_root);
    }

    #[test]
    fn indexed_root_is_sensitive_to_ordering() {
        let h1 = sha256(b"tx1");
        let h2 = sha256(b"tx2");

        let forward = compute_indexed_root([&h1, &h2]);
        let backward = compute_indexed_root([&h2, &h1]);

        assert_ne!(forward, backward, "swapping indices must change the root");
    }

    #[test]
    fn indexed_root_matches_manual_insertion() {
        let h1 = sha256(b"tx1");
        let h2 = sha256(b"tx2");

        let mut manual = MerkleTrie::new();
        manual.insert(&shardchain_rlp_key(0), h1.as_bytes().to_vec());
        manual.insert(&shardchain_rlp_key(1), h2.as_bytes().to_vec());

        assert_eq!(compute_indexed_root([&h1, &h2]), manual.root_hash());
    }

    #[test]
    fn empty_indexed_root_matches_empty_trie() {
        let empty: Vec<H256> = Vec::new();
        assert_eq!(compute_indexed_root(&empty), MerkleTrie::new().root_hash());
    }

    #[test]
    fn single_entry_trie_collapses_to_one_leaf() {
        let mut trie = MerkleTrie::new();
        trie.insert(&shardchain_rlp_key(0), vec![0xaa; 32]);
        // Root should differ from the empty trie and be deterministic.
        let root_a = trie.root_hash();
        let mut trie_b = MerkleTrie::new();
        trie_b.insert(&shardchain_rlp_key(0), vec![0xaa; 32]);
        assert_eq!(root_a, trie_b.root_hash());
    }
}
