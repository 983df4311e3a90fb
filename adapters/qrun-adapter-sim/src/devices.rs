//! Fake devices shaped like IBM hardware.
//!
//! Every fake device is operational and reports a fixed queue length so
//! least-busy selection is reproducible.

use qrun_hal::BackendDescriptor;

/// Native gates of the fake Falcon devices.
pub const IBM_BASIS: [&str; 7] = ["id", "rz", "sx", "x", "cx", "measure", "reset"];

/// Native gates of Eagle processors, entangling with `ecr`.
pub const EAGLE_BASIS: [&str; 7] = ["ecr", "id", "rz", "sx", "x", "measure", "reset"];

fn hardware(name: &str, num_qubits: u32, pending_jobs: u32, edges: &[[u32; 2]]) -> BackendDescriptor {
    with_basis(name, num_qubits, pending_jobs, &IBM_BASIS, edges)
}

fn with_basis(
    name: &str,
    num_qubits: u32,
    pending_jobs: u32,
    basis: &[&str],
    edges: &[[u32; 2]],
) -> BackendDescriptor {
    BackendDescriptor {
        name: name.into(),
        num_qubits,
        simulator: false,
        operational: true,
        pending_jobs,
        basis_gates: basis.iter().map(|g| (*g).to_string()).collect(),
        coupling_map: edges.to_vec(),
        status_msg: Some("active".into()),
    }
}

/// 5-qubit line.
pub fn fake_manila() -> BackendDescriptor {
    hardware("fake_manila", 5, 12, &[[0, 1], [1, 2], [2, 3], [3, 4]])
}

/// 7-qubit H shape.
pub fn fake_nairobi() -> BackendDescriptor {
    hardware(
        "fake_nairobi",
        7,
        3,
        &[[0, 1], [1, 2], [1, 3], [3, 5], [4, 5], [5, 6]],
    )
}

/// 16-qubit heavy-hex fragment.
pub fn fake_guadalupe() -> BackendDescriptor {
    hardware(
        "fake_guadalupe",
        16,
        8,
        &[
            [0, 1],
            [1, 2],
            [1, 4],
            [2, 3],
            [3, 5],
            [4, 7],
            [5, 8],
            [6, 7],
            [7, 10],
            [8, 9],
            [8, 11],
            [10, 12],
            [11, 14],
            [12, 13],
            [12, 15],
            [13, 14],
        ],
    )
}

/// 12-qubit heavy-hex slice of an Eagle processor.
pub fn fake_eagle_slice() -> BackendDescriptor {
    with_basis(
        "fake_eagle_slice",
        12,
        20,
        &EAGLE_BASIS,
        &[
            [0, 1],
            [1, 2],
            [2, 3],
            [0, 4],
            [4, 5],
            [3, 6],
            [5, 7],
            [7, 8],
            [8, 9],
            [9, 10],
            [6, 10],
            [10, 11],
        ],
    )
}

/// Ideal all-to-all simulator without a native gate restriction.
pub fn statevector_simulator(num_qubits: u32) -> BackendDescriptor {
    BackendDescriptor {
        name: "statevector_simulator".into(),
        num_qubits,
        simulator: true,
        operational: true,
        pending_jobs: 0,
        basis_gates: Vec::new(),
        coupling_map: Vec::new(),
        status_msg: None,
    }
}

/// The default device list of [`crate::SimulatorService`].
pub fn fake_devices() -> Vec<BackendDescriptor> {
    vec![
        fake_manila(),
        fake_nairobi(),
        fake_guadalupe(),
        fake_eagle_slice(),
        statevector_simulator(crate::service::MAX_QUBITS),
    ]
}
