/// 페이지 문서 모델
/// 서버가 렌더링한 페이지를 요소 트리로 표현한다.
/// 모든 핸들러는 이 문서 하나만 공유하며, 잠금은 await 지점을 넘어 유지되지 않는다.
// region:    --- Imports
use indextree::{Arena, NodeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

// endregion: --- Imports

// region:    --- Element Model
/// 요소 데이터
#[derive(Debug, Default, Clone)]
pub struct ElementData {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// `data-*` 속성 (접두사 제외, 예: `end-time`)
    pub dataset: HashMap<String, String>,
    pub attributes: HashMap<String, String>,
    pub style: HashMap<String, String>,
    pub text: String,
    pub value: String,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug)]
struct Tree {
    arena: Arena<ElementData>,
    body: NodeId,
}

impl Tree {
    fn data(&self, node: NodeId) -> Option<&ElementData> {
        self.arena.get(node).map(|n| n.get())
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.arena.get_mut(node).map(|n| n.get_mut())
    }

    fn detach_children(&mut self, node: NodeId) {
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children {
            child.detach(&mut self.arena);
        }
    }
}
// endregion: --- Element Model

// region:    --- Document
/// 공유 문서 핸들
#[derive(Debug, Clone)]
pub struct Document {
    tree: Arc<Mutex<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 빈 `body`만 가진 문서 생성
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let body = arena.new_node(ElementData::new("body"));
        Self {
            tree: Arc::new(Mutex::new(Tree { arena, body })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 아레나에 할당된 전체 요소 수 (분리된 요소 포함)
    pub fn node_count(&self) -> usize {
        self.lock().arena.count()
    }

    pub fn body(&self) -> NodeId {
        self.lock().body
    }

    /// 문서에 연결되지 않은 새 요소 생성
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.lock().arena.new_node(ElementData::new(tag))
    }

    /// 요소 생성 빌더
    pub fn element(&self, tag: &str) -> ElementBuilder<'_> {
        ElementBuilder {
            doc: self,
            node: self.create_element(tag),
        }
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        let mut tree = self.lock();
        child.detach(&mut tree.arena);
        match parent.checked_append(child, &mut tree.arena) {
            Ok(()) => true,
            Err(e) => {
                warn!("{:<12} --> 자식 요소 추가 실패: {:?}", "Document", e);
                false
            }
        }
    }

    /// 첫 번째 자식으로 삽입
    pub fn prepend_child(&self, parent: NodeId, child: NodeId) -> bool {
        let mut tree = self.lock();
        child.detach(&mut tree.arena);
        match parent.checked_prepend(child, &mut tree.arena) {
            Ok(()) => true,
            Err(e) => {
                warn!("{:<12} --> 자식 요소 삽입 실패: {:?}", "Document", e);
                false
            }
        }
    }

    /// 문서에서 요소 제거
    /// 이미 제거된 요소라면 아무 것도 하지 않고 `false`를 반환한다.
    pub fn remove(&self, node: NodeId) -> bool {
        let mut tree = self.lock();
        if node == tree.body || !Self::connected(&tree, node) {
            return false;
        }
        node.detach(&mut tree.arena);
        true
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        Self::connected(&self.lock(), node)
    }

    fn connected(tree: &Tree, node: NodeId) -> bool {
        tree.data(node).is_some() && node.ancestors(&tree.arena).any(|a| a == tree.body)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.lock();
        tree.arena.get(node).and_then(|n| n.parent())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.lock();
        if tree.data(node).is_none() {
            return Vec::new();
        }
        node.children(&tree.arena).collect()
    }

    /// 기존 자식과 텍스트를 모두 지우고 새 자식으로 교체
    pub fn replace_children(&self, node: NodeId, children: &[NodeId]) {
        let mut tree = self.lock();
        tree.detach_children(node);
        if let Some(data) = tree.data_mut(node) {
            data.text.clear();
        }
        for &child in children {
            child.detach(&mut tree.arena);
            if let Err(e) = node.checked_append(child, &mut tree.arena) {
                warn!("{:<12} --> 자식 요소 교체 실패: {:?}", "Document", e);
            }
        }
    }

    // region:    --- Queries

    /// 문서 순서대로 클래스가 일치하는 요소 조회
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let tree = self.lock();
        tree.body
            .descendants(&tree.arena)
            .filter(|&n| tree.data(n).is_some_and(|d| d.has_class(class)))
            .collect()
    }

    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.elements_by_class(class).into_iter().next()
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.lock();
        tree.body
            .descendants(&tree.arena)
            .find(|&n| tree.data(n).is_some_and(|d| d.id.as_deref() == Some(id)))
    }

    /// 하위 요소 중 클래스가 일치하는 첫 요소 (자기 자신 제외)
    pub fn find_class_within(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let tree = self.lock();
        tree.data(root)?;
        root.descendants(&tree.arena)
            .skip(1)
            .find(|&n| tree.data(n).is_some_and(|d| d.has_class(class)))
    }

    /// `input[name="..."]` 조회
    pub fn find_input_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let tree = self.lock();
        tree.data(root)?;
        root.descendants(&tree.arena).skip(1).find(|&n| {
            tree.data(n).is_some_and(|d| {
                d.tag == "input" && d.attributes.get("name").map(String::as_str) == Some(name)
            })
        })
    }

    /// 자기 자신부터 조상 방향으로 클래스가 일치하는 가장 가까운 요소
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let tree = self.lock();
        tree.data(node)?;
        node.ancestors(&tree.arena)
            .find(|&n| tree.data(n).is_some_and(|d| d.has_class(class)))
    }

    // endregion: --- Queries

    // region:    --- Accessors

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.lock().data(node).map(|d| d.tag.clone())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.lock().data(node).is_some_and(|d| d.has_class(class))
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(data) = self.lock().data_mut(node) {
            if !data.has_class(class) {
                data.classes.push(class.to_string());
            }
        }
    }

    /// 클래스 토글, 토글 후 클래스 존재 여부 반환
    pub fn toggle_class(&self, node: NodeId, class: &str) -> bool {
        let mut tree = self.lock();
        let Some(data) = tree.data_mut(node) else {
            return false;
        };
        if let Some(pos) = data.classes.iter().position(|c| c == class) {
            data.classes.remove(pos);
            false
        } else {
            data.classes.push(class.to_string());
            true
        }
    }

    pub fn class_name(&self, node: NodeId) -> String {
        self.lock()
            .data(node)
            .map(|d| d.classes.join(" "))
            .unwrap_or_default()
    }

    pub fn dataset(&self, node: NodeId, key: &str) -> Option<String> {
        self.lock().data(node)?.dataset.get(key).cloned()
    }

    pub fn set_dataset(&self, node: NodeId, key: &str, value: &str) {
        if let Some(data) = self.lock().data_mut(node) {
            data.dataset.insert(key.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.lock().data(node)?.attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(data) = self.lock().data_mut(node) {
            data.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(data) = self.lock().data_mut(node) {
            data.attributes.remove(name);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.lock().data(node)?.style.get(property).cloned()
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.lock().data_mut(node) {
            data.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        self.lock().data(node).map(|d| d.value.clone())
    }

    pub fn set_value(&self, node: NodeId, value: &str) {
        if let Some(data) = self.lock().data_mut(node) {
            data.value = value.to_string();
        }
    }

    /// 자식을 모두 지우고 텍스트만 남김
    pub fn set_text(&self, node: NodeId, text: &str) {
        let mut tree = self.lock();
        tree.detach_children(node);
        if let Some(data) = tree.data_mut(node) {
            data.text = text.to_string();
        }
    }

    /// 자신과 하위 요소의 텍스트를 문서 순서대로 이어 붙임
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.lock();
        if tree.data(node).is_none() {
            return String::new();
        }
        node.descendants(&tree.arena)
            .filter_map(|n| tree.data(n))
            .map(|d| d.text.as_str())
            .collect()
    }

    // endregion: --- Accessors
}
// endregion: --- Document

// region:    --- Element Builder
/// 테스트와 데모 페이지 구성을 위한 요소 빌더
pub struct ElementBuilder<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl ElementBuilder<'_> {
    pub fn id(self, id: &str) -> Self {
        if let Some(data) = self.doc.lock().data_mut(self.node) {
            data.id = Some(id.to_string());
        }
        self
    }

    pub fn class(self, class: &str) -> Self {
        for c in class.split_whitespace() {
            self.doc.add_class(self.node, c);
        }
        self
    }

    pub fn data(self, key: &str, value: &str) -> Self {
        self.doc.set_dataset(self.node, key, value);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.doc.set_attribute(self.node, name, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.doc.set_text(self.node, text);
        self
    }

    pub fn value(self, value: &str) -> Self {
        self.doc.set_value(self.node, value);
        self
    }

    pub fn child(self, child: NodeId) -> Self {
        self.doc.append_child(self.node, child);
        self
    }

    pub fn append_to(self, parent: NodeId) -> NodeId {
        self.doc.append_child(parent, self.node);
        self.node
    }

    pub fn build(self) -> NodeId {
        self.node
    }
}
// endregion: --- Element Builder
