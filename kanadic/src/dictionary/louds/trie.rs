//! LOUDSトライ
//!
//! LOUDSビット列に、ノードごとの終端ビット列と辺ラベルのバイト列を加えたものです。
//! 終端ノードのIDは、そのノードより前にある終端ビットの数です。
//!
//! イメージの形式は、リトルエンディアンの32ビット整数4つ(LOUDSビット列のバイト長、
//! 終端ビット列のバイト長、辺ラベルのビット幅、辺ラベルの個数)に続いて、
//! 3つのペイロードをこの順に並べたものです。

use crate::dictionary::config::LoudsCacheConfig;
use crate::dictionary::louds::{Louds, LoudsNode};
use crate::errors::{KanadicError, Result};
use crate::succinct::SuccinctBitVectorIndex;
use crate::utils::{read_len_le, FromU32};

pub(crate) const HEADER_LEN: usize = 16;
pub(crate) const BITS_PER_EDGE_LABEL: usize = 8;

/// バイト列をキーとするLOUDSトライ
#[derive(Clone, Debug)]
pub struct LoudsTrie<'a> {
    louds: Louds<'a>,
    terminal: SuccinctBitVectorIndex<'a>,
    edges: &'a [u8],
}

impl<'a> LoudsTrie<'a> {
    /// イメージからトライを構築します。
    ///
    /// # エラー
    ///
    /// ヘッダとペイロードの長さが一致しない場合、辺ラベルのビット幅が8でない場合、
    /// またはノード数に対して終端ビット列や辺ラベルが足りない場合に
    /// [`KanadicError::MalformedContainer`]を返します。
    pub fn new(image: &'a [u8], config: &LoudsCacheConfig) -> Result<Self> {
        let louds_len = read_len_le(image, 0, "trie")?;
        let terminal_len = read_len_le(image, 4, "trie")?;
        let bits_per_label = read_len_le(image, 8, "trie")?;
        let num_edges = read_len_le(image, 12, "trie")?;
        if bits_per_label != BITS_PER_EDGE_LABEL {
            return Err(KanadicError::malformed(
                "trie",
                format!("unsupported edge label width {bits_per_label}"),
            ));
        }
        let expected = HEADER_LEN + louds_len + terminal_len + num_edges;
        if expected != image.len() {
            return Err(KanadicError::malformed(
                "trie",
                format!("header expects {expected} bytes, got {}", image.len()),
            ));
        }

        let (louds_bytes, rest) = image[HEADER_LEN..].split_at(louds_len);
        let (terminal_bytes, edges) = rest.split_at(terminal_len);
        let louds = Louds::new(louds_bytes, config)?;
        let terminal = SuccinctBitVectorIndex::new(terminal_bytes, config.terminal())?;

        let num_nodes = louds.num_nodes();
        if num_nodes == 0 || edges.len() < num_nodes || terminal.len() < num_nodes {
            return Err(KanadicError::malformed(
                "trie",
                format!(
                    "{num_nodes} nodes, {} edge labels, {} terminal bits",
                    edges.len(),
                    terminal.len()
                ),
            ));
        }

        Ok(Self {
            louds,
            terminal,
            edges,
        })
    }

    /// 格納されているキーの数
    #[inline(always)]
    pub fn num_keys(&self) -> usize {
        self.terminal.num_ones()
    }

    #[inline(always)]
    fn is_terminal(&self, node: LoudsNode) -> bool {
        self.terminal.get(node.node_id - 1)
    }

    #[inline(always)]
    fn key_id(&self, node: LoudsNode) -> u32 {
        self.terminal.rank1(node.node_id - 1) as u32
    }

    #[inline(always)]
    fn edge_label(&self, node: LoudsNode) -> Option<u8> {
        self.edges.get(node.node_id.checked_sub(1)?).copied()
    }

    /// `label`の辺で`node`から子へ移動する
    #[inline(always)]
    fn find_child(&self, node: LoudsNode, label: u8) -> Option<LoudsNode> {
        let mut child = self.louds.move_to_first_child(node);
        while self.louds.is_valid_node(child) {
            if self.edge_label(child) == Some(label) {
                return Some(child);
            }
            child = self.louds.move_to_next_sibling(child);
        }
        None
    }

    /// 入力の接頭辞になっているキーを、短い順に`(ID, バイト長)`で返します。
    pub fn find_prefixes(&self, input: &[u8]) -> Vec<(u32, usize)> {
        let mut results = vec![];
        let mut node = self.louds.root();
        for (depth, &label) in input.iter().enumerate() {
            match self.find_child(node, label) {
                Some(child) => node = child,
                None => break,
            }
            if self.is_terminal(node) {
                results.push((self.key_id(node), depth + 1));
            }
        }
        results
    }

    /// 入力の接頭辞(完全一致を含む)になっているすべてのキーのIDを返します。
    pub fn find_key_ids_of_all_prefixes(&self, input: &[u8]) -> Vec<u32> {
        self.find_prefixes(input)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// 完全一致するキーのID
    pub fn lookup(&self, key: &[u8]) -> Option<u32> {
        let mut node = self.louds.root();
        for &label in key {
            node = self.find_child(node, label)?;
        }
        if key.is_empty() || !self.is_terminal(node) {
            return None;
        }
        Some(self.key_id(node))
    }

    /// IDからキーのバイト列を復元します。
    ///
    /// IDがキーの数以上の場合、またはイメージが壊れていて根まで辿れない場合は
    /// `None`を返します。
    pub fn restore_key_bytes(&self, id: u32) -> Option<Vec<u8>> {
        let id = usize::from_u32(id);
        if id >= self.num_keys() {
            return None;
        }
        let node_id = self.terminal.select1(id + 1) + 1;
        if node_id > self.louds.num_nodes() {
            return None;
        }
        let mut node = self.louds.init_from_node_id(node_id);
        let mut bytes = vec![];
        while !self.louds.is_root(node) {
            bytes.push(self.edge_label(node)?);
            // The parent must precede the node in level order.
            if node.edge_id < node.node_id || node.edge_id - node.node_id + 1 >= node.node_id {
                return None;
            }
            node = self.louds.move_to_parent(node);
        }
        bytes.reverse();
        Some(bytes)
    }

    /// IDからキーを復元し、終端の0x00を付けて返します。
    pub fn restore_key_string(&self, id: u32) -> Option<Vec<u8>> {
        let mut bytes = self.restore_key_bytes(id)?;
        bytes.push(0);
        Some(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::louds::builder::LoudsTrieBuilder;

    fn build(keys: &[&[u8]]) -> (Vec<u8>, Vec<u32>) {
        let mut builder = LoudsTrieBuilder::new();
        for key in keys {
            builder.push(key.to_vec());
        }
        let built = builder.build().unwrap();
        let ids = keys.iter().map(|k| built.get_id(k).unwrap()).collect();
        (built.into_image(), ids)
    }

    #[test]
    fn test_prefixes_and_restore() {
        let keys: &[&[u8]] = &[b"a", b"ab", b"abc", b"b", b"bc", b"abd"];
        let (image, ids) = build(keys);
        let trie = LoudsTrie::new(&image, &LoudsCacheConfig::KEY_TRIE).unwrap();
        assert_eq!(6, trie.num_keys());

        for (key, &id) in keys.iter().zip(&ids) {
            assert_eq!(Some(key.to_vec()), trie.restore_key_bytes(id));
            assert_eq!(Some(id), trie.lookup(key));
        }

        let found = trie.find_key_ids_of_all_prefixes(b"abcd");
        assert_eq!(vec![ids[0], ids[1], ids[2]], found);
        assert_eq!(
            vec![(ids[0], 1), (ids[1], 2)],
            trie.find_prefixes(b"abx")
        );
        assert!(trie.find_key_ids_of_all_prefixes(b"c").is_empty());
        assert_eq!(None, trie.lookup(b"bcd"));
        assert_eq!(None, trie.lookup(b""));
        assert_eq!(None, trie.restore_key_bytes(6));

        let mut with_terminator = b"bc".to_vec();
        with_terminator.push(0);
        assert_eq!(Some(with_terminator), trie.restore_key_string(ids[4]));
    }

    #[test]
    fn test_empty_trie() {
        let (image, _) = build(&[]);
        let trie = LoudsTrie::new(&image, &LoudsCacheConfig::NONE).unwrap();
        assert_eq!(0, trie.num_keys());
        assert!(trie.find_key_ids_of_all_prefixes(b"abc").is_empty());
    }

    #[test]
    fn test_malformed_header() {
        let (mut image, _) = build(&[&b"a"[..]]);
        image[8] = 16;
        assert!(LoudsTrie::new(&image, &LoudsCacheConfig::NONE).is_err());

        let (mut image, _) = build(&[&b"a"[..]]);
        image.push(0);
        assert!(LoudsTrie::new(&image, &LoudsCacheConfig::NONE).is_err());

        assert!(LoudsTrie::new(&[0; 8], &LoudsCacheConfig::NONE).is_err());
    }

    #[test]
    fn test_restore_from_corrupted_terminal_bits() {
        let (mut image, ids) = build(&[&b"a"[..], &b"b"[..]]);
        let louds_len = read_len_le(&image, 0, "trie").unwrap();
        let terminal_len = read_len_le(&image, 4, "trie").unwrap();
        // mark a padding bit past the last node as terminal
        image[HEADER_LEN + louds_len + terminal_len - 1] |= 0x80;

        let trie = LoudsTrie::new(&image, &LoudsCacheConfig::NONE).unwrap();
        assert_eq!(3, trie.num_keys());
        assert_eq!(Some(b"a".to_vec()), trie.restore_key_bytes(ids[0]));
        assert_eq!(Some(b"b".to_vec()), trie.restore_key_bytes(ids[1]));
        assert_eq!(None, trie.restore_key_bytes(2));
        assert_eq!(None, trie.restore_key_string(2));
    }
}
