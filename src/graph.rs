//! Pin-level material graph built from a material document.

use std::collections::{HashMap, VecDeque};

use anyhow::{Result, bail};
use log::debug;

use crate::compiler::error::MaterialCompileError;
use crate::compiler::registry::ExpressionKind;
use crate::compiler::types::{ComponentSelector, MaterialProperty, ValueType};
use crate::dsl::{MaterialDSL, MaterialDefaults, ROOT_NODE_TYPE, TextureAsset};
use crate::schema;

pub type NodeIndex = usize;

/// An output pin of a node; the link target of an input pin.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPin {
    pub node: NodeIndex,
    pub name: String,
    pub selector: ComponentSelector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputPin {
    pub name: String,
    pub link: Option<OutputPin>,
}

impl InputPin {
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub index: NodeIndex,
    pub id: String,
    pub kind: ExpressionKind,
    pub params: HashMap<String, serde_json::Value>,
    pub inputs: Vec<InputPin>,
    pub outputs: Vec<OutputPin>,
}

impl GraphNode {
    pub fn input(&self, name: &str) -> Option<&InputPin> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputPin> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// The output pin linked into `input`, if any.
    pub fn linked_input(&self, input: &str) -> Option<&OutputPin> {
        self.input(input).and_then(|p| p.link.as_ref())
    }
}

/// One semantic input of the root node.
#[derive(Debug, Clone)]
pub struct RootSlot {
    pub property: MaterialProperty,
    pub value_type: ValueType,
    pub visible: bool,
    pub link: Option<OutputPin>,
}

#[derive(Debug, Clone)]
pub struct MaterialGraph {
    pub name: String,
    nodes: Vec<GraphNode>,
    index_by_id: HashMap<String, NodeIndex>,
    root: Vec<RootSlot>,
    textures: HashMap<String, TextureAsset>,
    defaults: MaterialDefaults,
}

impl MaterialGraph {
    /// Rebuild the pin graph from `material`.
    ///
    /// Rejects connections to unknown nodes or pins, a second link into the same input,
    /// more than one root node, and cycles.
    pub fn rebuild(material: &MaterialDSL) -> Result<Self> {
        let scheme = schema::load_default_scheme()?;

        let mut nodes: Vec<GraphNode> = Vec::with_capacity(material.nodes.len());
        // Whether each node's pin layout comes from the scheme.
        let mut fixed_pins: Vec<bool> = Vec::with_capacity(material.nodes.len());
        let mut index_by_id: HashMap<String, NodeIndex> = HashMap::new();
        let mut root_id: Option<&str> = None;

        for node in &material.nodes {
            if node.node_type == ROOT_NODE_TYPE {
                if let Some(existing) = root_id {
                    bail!(
                        "expected at most 1 {ROOT_NODE_TYPE} node, got {existing} and {}",
                        node.id
                    );
                }
                root_id = Some(node.id.as_str());
                continue;
            }
            if index_by_id.contains_key(&node.id) {
                bail!("duplicate node id: {}", node.id);
            }

            let index = nodes.len();
            let (inputs, outputs) = match scheme.get(&node.node_type) {
                Some(s) => (
                    s.inputs
                        .iter()
                        .map(|name| InputPin {
                            name: name.clone(),
                            link: None,
                        })
                        .collect(),
                    s.outputs
                        .iter()
                        .map(|name| output_pin(index, name))
                        .collect(),
                ),
                // Unknown kinds get their pins from the connections below.
                None => (Vec::new(), vec![output_pin(index, "")]),
            };

            fixed_pins.push(scheme.get(&node.node_type).is_some());
            index_by_id.insert(node.id.clone(), index);
            nodes.push(GraphNode {
                index,
                id: node.id.clone(),
                kind: ExpressionKind::from_node_type(&node.node_type),
                params: node.params.clone(),
                inputs,
                outputs,
            });
        }

        let mut root: Vec<RootSlot> = MaterialProperty::ALL
            .into_iter()
            .map(|property| RootSlot {
                property,
                value_type: property.value_type(),
                visible: property.is_visible(&material.settings),
                link: None,
            })
            .collect();

        for c in &material.connections {
            if root_id == Some(c.from.node_id.as_str()) {
                bail!("connection {} starts at the root node, which has no outputs", c.id);
            }
            let Some(&from) = index_by_id.get(&c.from.node_id) else {
                bail!(
                    "connection references missing node: {} -> {}",
                    c.from.node_id,
                    c.to.node_id
                );
            };
            let source = &mut nodes[from];
            let link = match source.output(&c.from.port_id) {
                Some(pin) => pin.clone(),
                None if !fixed_pins[from] => {
                    let pin = output_pin(from, &c.from.port_id);
                    source.outputs.push(pin.clone());
                    pin
                }
                None => bail!(
                    "node {} ({}) has no output pin '{}'",
                    source.id,
                    source.kind,
                    c.from.port_id
                ),
            };

            if root_id == Some(c.to.node_id.as_str()) {
                let Some(property) = MaterialProperty::from_id(&c.to.port_id) else {
                    bail!("unknown material root slot: {}", c.to.port_id);
                };
                let Some(slot) = root.iter_mut().find(|s| s.property == property) else {
                    bail!("unknown material root slot: {}", c.to.port_id);
                };
                if slot.link.is_some() {
                    bail!("root slot {} has more than one link", property.id());
                }
                slot.link = Some(link);
                continue;
            }

            let Some(&to) = index_by_id.get(&c.to.node_id) else {
                bail!(
                    "connection references missing node: {} -> {}",
                    c.from.node_id,
                    c.to.node_id
                );
            };
            let target = &mut nodes[to];
            match target.inputs.iter_mut().find(|p| p.name == c.to.port_id) {
                Some(pin) if pin.link.is_some() => bail!(
                    "input pin '{}' on node {} has more than one link",
                    c.to.port_id,
                    target.id
                ),
                Some(pin) => pin.link = Some(link),
                None if !fixed_pins[to] => target.inputs.push(InputPin {
                    name: c.to.port_id.clone(),
                    link: Some(link),
                }),
                None => bail!(
                    "node {} ({}) has no input pin '{}'",
                    target.id,
                    target.kind,
                    c.to.port_id
                ),
            }
        }

        let graph = MaterialGraph {
            name: material.metadata.name.clone(),
            nodes,
            index_by_id,
            root,
            textures: material
                .textures
                .iter()
                .map(|t| (t.name.clone(), t.clone()))
                .collect(),
            defaults: material.defaults,
        };
        topo_sort(&graph)?;

        debug!(
            "rebuilt material graph {}: {} nodes, {} connections",
            graph.name,
            graph.nodes.len(),
            material.connections.len()
        );
        Ok(graph)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index_by_id.get(id).map(|&i| &self.nodes[i])
    }

    /// Root slots in their fixed emission order.
    pub fn root_slots(&self) -> &[RootSlot] {
        &self.root
    }

    pub fn root_slot(&self, property: MaterialProperty) -> Option<&RootSlot> {
        self.root.iter().find(|s| s.property == property)
    }

    pub fn texture(&self, name: &str) -> Option<&TextureAsset> {
        self.textures.get(name)
    }

    pub fn defaults(&self) -> &MaterialDefaults {
        &self.defaults
    }
}

fn output_pin(node: NodeIndex, name: &str) -> OutputPin {
    OutputPin {
        node,
        name: name.to_string(),
        selector: ComponentSelector::from_pin_name(name),
    }
}

/// Order nodes so that every node comes after the nodes linked into it.
pub fn topo_sort(graph: &MaterialGraph) -> Result<Vec<NodeIndex>> {
    let mut indeg: Vec<usize> = vec![0; graph.nodes.len()];
    let mut outgoing: Vec<Vec<NodeIndex>> = vec![Vec::new(); graph.nodes.len()];
    for node in &graph.nodes {
        for link in node.inputs.iter().filter_map(|p| p.link.as_ref()) {
            indeg[node.index] += 1;
            outgoing[link.node].push(node.index);
        }
    }

    let mut q: VecDeque<NodeIndex> = (0..graph.nodes.len()).filter(|&i| indeg[i] == 0).collect();
    let mut order: Vec<NodeIndex> = Vec::with_capacity(graph.nodes.len());

    while let Some(n) = q.pop_front() {
        order.push(n);
        for &m in &outgoing[n] {
            indeg[m] -= 1;
            if indeg[m] == 0 {
                q.push_back(m);
            }
        }
    }

    if order.len() != graph.nodes.len() {
        let stuck = (0..graph.nodes.len())
            .find(|&i| indeg[i] > 0)
            .map(|i| graph.nodes[i].id.clone())
            .unwrap_or_default();
        return Err(MaterialCompileError::CycleDetected { node: stuck }.into());
    }
    Ok(order)
}
