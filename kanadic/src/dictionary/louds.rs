//! LOUDS表現の順序木のナビゲーション
//!
//! ノードは`(node_id, edge_id)`の組で表されます。`node_id`はレベル順で1から振られた番号、
//! `edge_id`はそのノードを定義する1ビットのLOUDSビット列上の位置です。
//! ポインタを持たず、`select0`/`select1`だけで親子間を移動します。

pub mod builder;
pub mod trie;

use crate::dictionary::config::LoudsCacheConfig;
use crate::errors::Result;
use crate::succinct::SuccinctBitVectorIndex;
use crate::utils::FromU32;

/// 木の中の位置
///
/// 走査のたびにビット索引から再計算される値で、保存はしません。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct LoudsNode {
    pub node_id: usize,
    pub edge_id: usize,
}

/// LOUDSビット列とその索引
#[derive(Clone, Debug)]
pub struct Louds<'a> {
    index: SuccinctBitVectorIndex<'a>,
    // select0_cache[i - 1] = select0(i) + 1
    select0_cache: Vec<u32>,
    // select1_cache[i - 1] = select1(i)
    select1_cache: Vec<u32>,
}

impl<'a> Louds<'a> {
    /// LOUDSビット列から索引を構築します。
    pub fn new(data: &'a [u8], config: &LoudsCacheConfig) -> Result<Self> {
        let index = SuccinctBitVectorIndex::new(data, config.louds)?;
        let n0 = config.select0_cache_size.min(index.num_zeros());
        let select0_cache = (1..=n0).map(|i| (index.select0(i) + 1) as u32).collect();
        let n1 = config.select1_cache_size.min(index.num_ones());
        let select1_cache = (1..=n1).map(|i| index.select1(i) as u32).collect();
        Ok(Self {
            index,
            select0_cache,
            select1_cache,
        })
    }

    /// 根を含むノードの総数
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.index.num_ones()
    }

    #[inline(always)]
    fn select0_plus_one(&self, n: usize) -> usize {
        match self.select0_cache.get(n.wrapping_sub(1)) {
            Some(&pos) => usize::from_u32(pos),
            None => self.index.select0(n) + 1,
        }
    }

    #[inline(always)]
    fn select1(&self, n: usize) -> usize {
        match self.select1_cache.get(n.wrapping_sub(1)) {
            Some(&pos) => usize::from_u32(pos),
            None => self.index.select1(n),
        }
    }

    /// 根ノード
    #[inline(always)]
    pub fn root(&self) -> LoudsNode {
        self.init_from_node_id(1)
    }

    /// ノードが実在するか
    ///
    /// 子や兄弟への移動の結果、その位置が0ビットであれば実在しません。
    #[inline(always)]
    pub fn is_valid_node(&self, node: LoudsNode) -> bool {
        node.edge_id < self.index.len() && self.index.get(node.edge_id)
    }

    #[inline(always)]
    pub const fn is_root(&self, node: LoudsNode) -> bool {
        node.node_id == 1
    }

    /// 最初の子に移動する
    #[inline(always)]
    pub fn move_to_first_child(&self, node: LoudsNode) -> LoudsNode {
        let edge_id = self.select0_plus_one(node.node_id);
        LoudsNode {
            node_id: edge_id - node.node_id + 1,
            edge_id,
        }
    }

    /// 次の兄弟に移動する
    #[inline(always)]
    pub const fn move_to_next_sibling(&self, node: LoudsNode) -> LoudsNode {
        LoudsNode {
            node_id: node.node_id + 1,
            edge_id: node.edge_id + 1,
        }
    }

    /// 親に移動する
    #[inline(always)]
    pub fn move_to_parent(&self, node: LoudsNode) -> LoudsNode {
        let node_id = node.edge_id - node.node_id + 1;
        LoudsNode {
            node_id,
            edge_id: self.select1(node_id),
        }
    }

    /// ノード番号からノードを得る
    #[inline(always)]
    pub fn init_from_node_id(&self, node_id: usize) -> LoudsNode {
        LoudsNode {
            node_id,
            edge_id: self.select1(node_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::succinct::BitStream;

    // root -> {2, 3}, 2 -> {4}, 3 -> {}, 4 -> {}
    fn sample() -> Vec<u8> {
        let mut bs = BitStream::new();
        for bit in [1, 0, 1, 1, 0, 1, 0, 0, 0] {
            bs.push(bit == 1);
        }
        bs.into_bytes()
    }

    #[test]
    fn test_navigation() {
        let data = sample();
        for config in [LoudsCacheConfig::NONE, LoudsCacheConfig::KEY_TRIE] {
            let louds = Louds::new(&data, &config).unwrap();
            assert_eq!(4, louds.num_nodes());

            let root = louds.root();
            assert!(louds.is_root(root));
            assert_eq!(LoudsNode { node_id: 1, edge_id: 0 }, root);

            let n2 = louds.move_to_first_child(root);
            assert!(louds.is_valid_node(n2));
            assert_eq!(LoudsNode { node_id: 2, edge_id: 2 }, n2);

            let n3 = louds.move_to_next_sibling(n2);
            assert!(louds.is_valid_node(n3));
            assert!(!louds.is_valid_node(louds.move_to_next_sibling(n3)));

            let n4 = louds.move_to_first_child(n2);
            assert_eq!(LoudsNode { node_id: 4, edge_id: 5 }, n4);
            assert!(!louds.is_valid_node(louds.move_to_first_child(n3)));
            assert!(!louds.is_valid_node(louds.move_to_first_child(n4)));

            assert_eq!(n2, louds.move_to_parent(n4));
            assert_eq!(root, louds.move_to_parent(n3));
            assert_eq!(n4, louds.init_from_node_id(4));
        }
    }
}
