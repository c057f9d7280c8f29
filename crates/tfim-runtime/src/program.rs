//! Input bundle for the runtime `vqe` program.
//!
//! The remote program receives a JSON object:
//!
//! ```text
//! {
//!   "ansatz":                       { "name": "EfficientSU2", ..., "qasm": "OPENQASM 3.0; ..." },
//!   "initial_parameters":           null | [f64, ...],
//!   "operator":                     [["XIII", -1.0], ...],
//!   "optimizer":                    { "name": "SPSA", "maxiter": 1000 },
//!   "aux_operators":                { "x_mag": [...], "z_mag": [...] },
//!   "measurement_error_mitigation": true,
//!   "shots":                        1024
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tfim_ops::SparsePauliOp;

use crate::error::{RuntimeError, RuntimeResult};

/// Operator on the wire: `[label, coeff]` pairs in tensor order.
pub type WireOperator = Vec<(String, f64)>;

/// Single-qubit rotation used in an SU(2) layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Su2Gate {
    /// X rotation.
    Rx,
    /// Y rotation.
    Ry,
    /// Z rotation.
    Rz,
}

impl Su2Gate {
    /// OpenQASM 3 gate name.
    pub fn name(self) -> &'static str {
        match self {
            Su2Gate::Rx => "rx",
            Su2Gate::Ry => "ry",
            Su2Gate::Rz => "rz",
        }
    }
}

/// CX placement between rotation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entanglement {
    /// `(i, i+1)` for `i` in `0..n-1`.
    Linear,
    /// Linear plus `(n-1, 0)`.
    Circular,
    /// Every pair `(i, j)` with `i < j`.
    Full,
}

impl Entanglement {
    /// Control/target pairs for a register of `n` qubits, in gate order.
    ///
    /// The circular wrap-around pair `(n - 1, 0)` comes first.
    pub fn pairs(self, n: usize) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = match self {
            Entanglement::Linear | Entanglement::Circular => {
                (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect()
            }
            Entanglement::Full => (0..n)
                .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
                .collect(),
        };
        if self == Entanglement::Circular && n > 2 {
            pairs.insert(0, (n - 1, 0));
        }
        pairs
    }
}

/// Layer layout of an EfficientSU2 ansatz, independent of width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Su2Layout {
    /// Number of entangling repetitions.
    #[serde(default = "default_reps")]
    pub reps: usize,
    /// Rotation gates applied in every rotation layer, in order.
    #[serde(default = "default_su2_gates")]
    pub su2_gates: Vec<Su2Gate>,
    /// Entangler placement.
    #[serde(default = "default_entanglement")]
    pub entanglement: Entanglement,
    /// Insert barriers around entangling layers.
    #[serde(default = "default_true")]
    pub insert_barriers: bool,
}

fn default_reps() -> usize {
    2
}

fn default_su2_gates() -> Vec<Su2Gate> {
    vec![Su2Gate::Ry, Su2Gate::Rz]
}

fn default_entanglement() -> Entanglement {
    Entanglement::Linear
}

fn default_true() -> bool {
    true
}

impl Default for Su2Layout {
    fn default() -> Self {
        Self {
            reps: default_reps(),
            su2_gates: default_su2_gates(),
            entanglement: default_entanglement(),
            insert_barriers: true,
        }
    }
}

/// Hardware-efficient SU(2) ansatz.
///
/// `reps` blocks of (rotation layer, entangling layer) followed by a final
/// rotation layer. Each rotation layer applies every gate in `su2_gates` to
/// every qubit, one gate kind at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficientSu2 {
    num_qubits: usize,
    layout: Su2Layout,
}

impl EfficientSu2 {
    /// Create an ansatz on `num_qubits` with the given layout.
    pub fn new(num_qubits: usize, layout: Su2Layout) -> RuntimeResult<Self> {
        if num_qubits == 0 {
            return Err(RuntimeError::InvalidParameter(
                "ansatz needs at least one qubit".into(),
            ));
        }
        if layout.su2_gates.is_empty() {
            return Err(RuntimeError::InvalidParameter(
                "ansatz needs at least one rotation gate".into(),
            ));
        }
        Ok(Self { num_qubits, layout })
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Layer layout.
    pub fn layout(&self) -> &Su2Layout {
        &self.layout
    }

    /// Free parameters: `n · |gates| · (reps + 1)`.
    pub fn num_parameters(&self) -> usize {
        self.num_qubits * self.layout.su2_gates.len() * (self.layout.reps + 1)
    }

    /// OpenQASM 3 source with one `input float[64] theta_k;` per parameter.
    pub fn to_qasm3(&self) -> String {
        let n = self.num_qubits;
        let mut out = String::new();
        out.push_str("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n");
        for k in 0..self.num_parameters() {
            let _ = writeln!(out, "input float[64] theta_{k};");
        }
        let _ = writeln!(out, "qubit[{n}] q;");

        let mut param = 0usize;
        let mut rotation_layer = |out: &mut String| {
            for gate in &self.layout.su2_gates {
                for q in 0..n {
                    let _ = writeln!(out, "{}(theta_{param}) q[{q}];", gate.name());
                    param += 1;
                }
            }
        };

        for _ in 0..self.layout.reps {
            rotation_layer(&mut out);
            if self.layout.insert_barriers {
                out.push_str("barrier q;\n");
            }
            for (c, t) in self.layout.entanglement.pairs(n) {
                let _ = writeln!(out, "cx q[{c}], q[{t}];");
            }
            if self.layout.insert_barriers {
                out.push_str("barrier q;\n");
            }
        }
        rotation_layer(&mut out);
        out
    }

    /// Serialisable description sent to the runtime.
    pub fn payload(&self) -> AnsatzPayload {
        AnsatzPayload {
            name: "EfficientSU2".to_string(),
            num_qubits: self.num_qubits,
            num_parameters: self.num_parameters(),
            layout: self.layout.clone(),
            qasm: self.to_qasm3(),
        }
    }
}

/// Ansatz as sent to the runtime program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsatzPayload {
    /// Circuit family name.
    pub name: String,
    /// Register width.
    pub num_qubits: usize,
    /// Number of `theta_k` inputs in `qasm`.
    pub num_parameters: usize,
    /// Layer layout.
    #[serde(flatten)]
    pub layout: Su2Layout,
    /// Parameterised OpenQASM 3 source.
    pub qasm: String,
}

/// SPSA optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename = "SPSA")]
pub struct Spsa {
    /// Maximum number of iterations.
    #[serde(default = "default_maxiter")]
    pub maxiter: u32,
    /// Fixed learning rate; calibrated by the program when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    /// Fixed perturbation; calibrated by the program when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perturbation: Option<f64>,
}

fn default_maxiter() -> u32 {
    1000
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: default_maxiter(),
            learning_rate: None,
            perturbation: None,
        }
    }
}

/// Full input bundle of one `vqe` job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeInputs {
    /// Trial circuit.
    pub ansatz: AnsatzPayload,
    /// Starting point; the program picks one when `None`.
    pub initial_parameters: Option<Vec<f64>>,
    /// Hamiltonian to minimise.
    pub operator: WireOperator,
    /// Classical optimizer.
    pub optimizer: Spsa,
    /// Observables evaluated at the optimum, keyed by name.
    pub aux_operators: BTreeMap<String, WireOperator>,
    /// Apply readout-error mitigation.
    pub measurement_error_mitigation: bool,
    /// Shots per circuit evaluation.
    pub shots: u32,
}

impl VqeInputs {
    /// Assemble and check an input bundle.
    pub fn new(
        ansatz: &EfficientSu2,
        operator: &SparsePauliOp,
        optimizer: Spsa,
        aux_operators: &[(&str, &SparsePauliOp)],
        initial_parameters: Option<Vec<f64>>,
        measurement_error_mitigation: bool,
        shots: u32,
    ) -> RuntimeResult<Self> {
        if shots == 0 {
            return Err(RuntimeError::InvalidParameter(
                "shots must be at least 1".into(),
            ));
        }
        if operator.num_qubits() != ansatz.num_qubits() {
            return Err(RuntimeError::InvalidParameter(format!(
                "operator acts on {} qubits but the ansatz has {}",
                operator.num_qubits(),
                ansatz.num_qubits()
            )));
        }
        if let Some(params) = &initial_parameters {
            if params.len() != ansatz.num_parameters() {
                return Err(RuntimeError::InvalidParameter(format!(
                    "expected {} initial parameters, got {}",
                    ansatz.num_parameters(),
                    params.len()
                )));
            }
        }
        for (name, aux) in aux_operators {
            if aux.num_qubits() != ansatz.num_qubits() {
                return Err(RuntimeError::InvalidParameter(format!(
                    "aux operator '{name}' acts on {} qubits but the ansatz has {}",
                    aux.num_qubits(),
                    ansatz.num_qubits()
                )));
            }
        }

        Ok(Self {
            ansatz: ansatz.payload(),
            initial_parameters,
            operator: operator.to_list(),
            optimizer,
            aux_operators: aux_operators
                .iter()
                .map(|(name, op)| ((*name).to_string(), op.to_list()))
                .collect(),
            measurement_error_mitigation,
            shots,
        })
    }

    /// JSON value for the request body.
    pub fn to_json(&self) -> RuntimeResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Per-job options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Backend the job runs on.
    pub backend_name: String,
    /// Access instance, `hub/group/project`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl RunOptions {
    /// Options targeting `backend_name` with no instance.
    pub fn new(backend_name: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            instance: None,
        }
    }

    /// Set the access instance.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Split the instance into `(hub, group, project)`.
    pub fn instance_parts(&self) -> RuntimeResult<Option<(&str, &str, &str)>> {
        let Some(instance) = self.instance.as_deref() else {
            return Ok(None);
        };
        let parts: Vec<&str> = instance.split('/').collect();
        match parts.as_slice() {
            [hub, group, project] if !hub.is_empty() && !group.is_empty() && !project.is_empty() => {
                Ok(Some((*hub, *group, *project)))
            }
            _ => Err(RuntimeError::InvalidParameter(format!(
                "instance '{instance}' is not of the form hub/group/project"
            ))),
        }
    }
}
