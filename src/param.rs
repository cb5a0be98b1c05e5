//! Rate-polymorphic parameters
//!
//! Every node parameter is either a constant or the output block of another
//! node. Bindings are resolved once per block into [`ResolvedParam`]s that the
//! per-sample loop reads with `at(i)`, so a node has a single generic loop
//! regardless of which parameters are streamed.

use crate::audio_node::NodeId;
use crate::error::{DspError, DspResult};

/// Most parameters a node can declare, `mul` and `add` included
pub const MAX_PARAMS: usize = 10;

/// Parameter binding
///
/// # Example
/// ```ignore
/// let mut delay = DelayNode::new(0, 0.25, 0.0, 1.0, 44100.0)?;
/// delay.set_param("delay", Param::Streamed(lfo_id))?;  // modulated
/// delay.set_param("delay", Param::Constant(0.5))?;     // fixed again
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    /// Fixed value, resolved once per block
    Constant(f32),
    /// Current output block of another node, read per sample
    Streamed(NodeId),
}

impl Param {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Param::Constant(_) => None,
            Param::Streamed(id) => Some(*id),
        }
    }
}

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        Param::Constant(value)
    }
}

/// Order of the output stage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleOrder {
    /// `raw * mul + add`
    #[default]
    MulThenAdd,
    /// `(raw + add) * mul`
    AddThenMul,
}

/// A binding resolved for the current block
#[derive(Debug, Clone, Copy)]
pub enum ResolvedParam<'a> {
    Constant(f32),
    Streamed(&'a [f32]),
}

impl<'a> ResolvedParam<'a> {
    /// Value at sample `i` of the block
    #[inline]
    pub fn at(&self, i: usize) -> f32 {
        match *self {
            ResolvedParam::Constant(v) => v,
            ResolvedParam::Streamed(buf) => buf[i],
        }
    }
}

/// Walks the `inputs` slice of `process_block` in `input_nodes()` order
pub struct InputCursor<'a> {
    inputs: &'a [&'a [f32]],
    next: usize,
}

impl<'a> InputCursor<'a> {
    pub fn new(inputs: &'a [&'a [f32]]) -> Self {
        Self { inputs, next: 0 }
    }

    /// Next upstream block, read as an audio signal
    ///
    /// A missing input reads as silence.
    pub fn signal(&mut self) -> ResolvedParam<'a> {
        match self.take() {
            Some(buf) => ResolvedParam::Streamed(buf),
            None => ResolvedParam::Constant(0.0),
        }
    }

    /// Resolve one binding, consuming an input only when it is streamed
    pub fn resolve(&mut self, binding: Param) -> ResolvedParam<'a> {
        match binding {
            Param::Constant(v) => ResolvedParam::Constant(v),
            Param::Streamed(_) => self.signal(),
        }
    }

    /// Number of inputs consumed so far
    pub fn consumed(&self) -> usize {
        self.next
    }

    fn take(&mut self) -> Option<&'a [f32]> {
        let buf = self.inputs.get(self.next).copied();
        debug_assert!(
            buf.is_some(),
            "Input {} missing ({} provided)",
            self.next,
            self.inputs.len()
        );
        self.next += 1;
        buf
    }
}

/// Named parameter bindings of one node
///
/// Declared parameters come first, in the order given to [`ParamTable::new`];
/// `mul` and `add` are appended as the last two entries.
#[derive(Debug, Clone)]
pub struct ParamTable {
    names: Vec<&'static str>,
    bindings: Vec<Param>,
    order: ScaleOrder,
}

impl ParamTable {
    /// Build a table from `(name, default)` pairs
    pub fn new(defaults: &[(&'static str, f32)]) -> Self {
        assert!(
            defaults.len() + 2 <= MAX_PARAMS,
            "A node may declare at most {} parameters",
            MAX_PARAMS - 2
        );

        let mut names: Vec<&'static str> = defaults.iter().map(|(name, _)| *name).collect();
        let mut bindings: Vec<Param> = defaults
            .iter()
            .map(|(_, value)| Param::Constant(*value))
            .collect();
        names.extend(["mul", "add"]);
        bindings.extend([Param::Constant(1.0), Param::Constant(0.0)]);

        Self {
            names,
            bindings,
            order: ScaleOrder::MulThenAdd,
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }

    pub fn get(&self, name: &str) -> Option<Param> {
        self.index_of(name).map(|index| self.bindings[index])
    }

    pub fn set(&mut self, name: &str, binding: Param) -> DspResult<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| DspError::UnknownParam(name.to_string()))?;
        self.bindings[index] = binding;
        Ok(())
    }

    pub fn scale_order(&self) -> ScaleOrder {
        self.order
    }

    pub fn set_scale_order(&mut self, order: ScaleOrder) {
        self.order = order;
    }

    /// Nodes behind streamed bindings, in declaration order
    pub fn streamed_inputs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.bindings.iter().filter_map(Param::node)
    }

    /// Resolve every binding for this block
    ///
    /// Must be called after all signal inputs were taken from `cursor`.
    pub fn resolve<'a>(&self, cursor: &mut InputCursor<'a>) -> ResolvedParams<'a> {
        let mut slots = [ResolvedParam::Constant(0.0); MAX_PARAMS];
        for (slot, binding) in slots.iter_mut().zip(&self.bindings) {
            *slot = cursor.resolve(*binding);
        }

        ResolvedParams {
            slots,
            len: self.bindings.len(),
            order: self.order,
        }
    }
}

/// All bindings of a node resolved for one block
pub struct ResolvedParams<'a> {
    slots: [ResolvedParam<'a>; MAX_PARAMS],
    len: usize,
    order: ScaleOrder,
}

impl<'a> ResolvedParams<'a> {
    /// Value of parameter `index` at sample `i`
    #[inline]
    pub fn at(&self, index: usize, i: usize) -> f32 {
        self.slots[index].at(i)
    }

    /// Apply the `mul`/`add` output stage in place
    pub fn scale_output(&self, output: &mut [f32]) {
        let mul = self.slots[self.len - 2];
        let add = self.slots[self.len - 1];

        if let (ResolvedParam::Constant(m), ResolvedParam::Constant(a)) = (mul, add) {
            if m == 1.0 && a == 0.0 {
                return;
            }
        }

        match self.order {
            ScaleOrder::MulThenAdd => {
                for (i, sample) in output.iter_mut().enumerate() {
                    *sample = *sample * mul.at(i) + add.at(i);
                }
            }
            ScaleOrder::AddThenMul => {
                for (i, sample) in output.iter_mut().enumerate() {
                    *sample = (*sample + add.at(i)) * mul.at(i);
                }
            }
        }
    }
}
