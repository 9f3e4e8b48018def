// ==========================================
// 服务监控看板 - 服务树
// ==========================================
// 存储: 节点数组 (arena) + ID 索引
// 约束: 每个节点至多一个父节点,不允许环
// ==========================================

use crate::domain::check::NodeStatusView;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::{ServiceNode, UpdateState};
use std::collections::HashMap;

// ==========================================
// ServiceTree - 服务树
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ServiceTree {
    name: String,
    nodes: Vec<ServiceNode>,
    index: HashMap<String, usize>,
}

impl ServiceTree {
    /// 创建空服务树
    ///
    /// # 参数
    /// - `name`: 视图名称 (QoS 快照中使用)
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ==========================================
    // 拓扑构建
    // ==========================================

    /// 插入孤立节点 (不挂父节点)
    ///
    /// # 返回
    /// 节点下标
    pub fn insert(&mut self, mut node: ServiceNode) -> TreeResult<usize> {
        if self.index.contains_key(&node.id) {
            return Err(TreeError::DuplicateNode { id: node.id });
        }

        node.parent = None;
        node.children.clear();

        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        Ok(idx)
    }

    /// 建立父子关系
    ///
    /// # 错误
    /// - 节点不存在
    /// - 子节点已有父节点
    /// - 形成环
    pub fn attach(&mut self, child_id: &str, parent_id: &str) -> TreeResult<()> {
        let child = self.require(child_id)?;
        let parent = self.require(parent_id)?;

        if let Some(existing) = self.nodes[child].parent {
            return Err(TreeError::ParentAlreadySet {
                id: child_id.to_string(),
                parent: self.nodes[existing].id.clone(),
            });
        }

        // 从父节点向上回溯,遇到子节点即成环
        let mut cursor = Some(parent);
        while let Some(idx) = cursor {
            if idx == child {
                return Err(TreeError::CycleDetected {
                    id: child_id.to_string(),
                    parent: parent_id.to_string(),
                });
            }
            cursor = self.nodes[idx].parent;
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.nodes[parent].update_state = UpdateState::Stale;
        Ok(())
    }

    /// 插入节点并挂到父节点下
    pub fn add_child(&mut self, parent_id: &str, node: ServiceNode) -> TreeResult<usize> {
        self.require(parent_id)?;
        let child_id = node.id.clone();
        let idx = self.insert(node)?;
        self.attach(&child_id, parent_id)?;
        Ok(idx)
    }

    fn require(&self, id: &str) -> TreeResult<usize> {
        self.index_of(id).ok_or_else(|| TreeError::NodeNotFound { id: id.to_string() })
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&ServiceNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    /// 按下标访问 (下标来自 index_of / children_of)
    pub fn node(&self, idx: usize) -> &ServiceNode {
        &self.nodes[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut ServiceNode {
        &mut self.nodes[idx]
    }

    pub fn parent_of(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].parent
    }

    pub fn children_of(&self, idx: usize) -> &[usize] {
        &self.nodes[idx].children
    }

    /// 所有根节点下标
    pub fn roots(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&idx| self.nodes[idx].parent.is_none())
            .collect()
    }

    /// 节点深度 (根为 0)
    pub fn depth(&self, idx: usize) -> usize {
        let mut depth = 0;
        let mut cursor = self.nodes[idx].parent;
        while let Some(p) = cursor {
            depth += 1;
            cursor = self.nodes[p].parent;
        }
        depth
    }

    /// 子树中的全部叶子节点
    pub fn leaves_under(&self, idx: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            let children = &self.nodes[current].children;
            if children.is_empty() {
                leaves.push(current);
            } else {
                stack.extend(children.iter().copied());
            }
        }
        leaves
    }

    // ==========================================
    // 展示层输出
    // ==========================================

    pub fn status_of(&self, id: &str) -> Option<NodeStatusView> {
        self.get(id).map(ServiceNode::status_view)
    }

    /// 全部节点状态 (按插入顺序)
    pub fn snapshot(&self) -> Vec<NodeStatusView> {
        self.nodes.iter().map(ServiceNode::status_view).collect()
    }

    /// 节点提示文本 (服务/描述/状态/计算规则/传播规则)
    pub fn tooltip(&self, id: &str) -> Option<String> {
        let node = self.get(id)?;
        let description = if node.description.is_empty() {
            crate::i18n::t("node.no_description")
        } else {
            node.description.clone()
        };
        Some(crate::i18n::t_with_args(
            "node.tooltip",
            &[
                ("name", node.name.as_str()),
                ("description", description.as_str()),
                ("status", node.aggregated_severity.label().as_str()),
                ("calc_rule", node.aggregation_rule.label().as_str()),
                ("prop_rule", node.propagation_rule.label().as_str()),
            ],
        ))
    }
}
