//! Host execution target.
//!
//! Emulates the accelerator seam on the CPU: buffers are byte vectors, the two-marker timer is an
//! [`Instant`], and every candidate dispatches through the host reference kernel. The
//! extended-backend enumeration is emulated with a fixed set of tuned variants whose split-K
//! members stage their reduction through the caller's workspace. This is the target the binary
//! uses when built without the `cuda` feature, and the vehicle the test suite drives the
//! orchestrator with.

use crate::algo::{AlgoDesc, AlgoId, LtTuning};
use crate::drivers::{DeviceBuf, ExecStatus, Operands, Target};
use crate::error::ProfError;
use crate::kernels;
use crate::types::GemmShape;

use std::time::Instant;

/// A plain byte buffer standing in for device memory.
pub struct HostBuf {
    data: Vec<u8>,
}

impl HostBuf {
    /// Read access for assertions in tests.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl DeviceBuf for HostBuf {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn device_addr(&self) -> usize {
        self.data.as_ptr() as usize
    }
}

/// CPU-backed [`Target`] implementation.
#[derive(Default)]
pub struct HostTarget {
    timer: Option<Instant>,
}

impl HostTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Target for HostTarget {
    type Buffer = HostBuf;

    fn name(&self) -> &str {
        "host"
    }

    // The emulation accepts the tensor-op enumeration too, so both tables get exercised.
    fn tensor_op_capable(&self) -> bool {
        true
    }

    fn alloc(&mut self, bytes: usize) -> Result<HostBuf, ProfError> {
        Ok(HostBuf { data: vec![0; bytes] })
    }

    fn upload(&mut self, buf: &mut HostBuf, bytes: &[u8]) -> Result<(), ProfError> {
        if buf.data.len() != bytes.len() {
            return Err(ProfError::Device(format!(
                "upload of {} bytes into a {}-byte buffer",
                bytes.len(),
                buf.data.len()
            )));
        }
        buf.data.copy_from_slice(bytes);
        Ok(())
    }

    fn download(&mut self, buf: &HostBuf) -> Result<Vec<u8>, ProfError> {
        Ok(buf.data.clone())
    }

    fn zero(&mut self, buf: &mut HostBuf) -> Result<(), ProfError> {
        buf.data.fill(0);
        Ok(())
    }

    fn timer_start(&mut self) -> Result<(), ProfError> {
        self.timer = Some(Instant::now());
        Ok(())
    }

    fn timer_stop(&mut self) -> Result<f32, ProfError> {
        let start = self
            .timer
            .take()
            .ok_or_else(|| ProfError::Device("timer stopped without a start marker".into()))?;
        Ok(start.elapsed().as_secs_f64() as f32 * 1e3)
    }

    fn gemm(&mut self, shape: &GemmShape, ops: &mut Operands<HostBuf>, algo: &AlgoDesc) -> ExecStatus {
        let d = kernels::reference_gemm(shape, &ops.a.data, &ops.b.data);
        if d.len() != ops.c.data.len() {
            return ExecStatus::InvalidValue;
        }
        match algo.tuning {
            // Split-K variants reduce through the caller's workspace. An under-provisioned
            // workspace rejects the candidate, as the backend would.
            Some(t) if t.workspace_size > 0 => match ops.workspace.as_mut() {
                Some(ws) if ws.data.len() >= t.workspace_size => {
                    ws.data[..d.len()].copy_from_slice(&d);
                    ops.c.data.copy_from_slice(&ws.data[..d.len()]);
                }
                _ => return ExecStatus::NotSupported,
            },
            _ => ops.c.data.copy_from_slice(&d),
        }
        ExecStatus::Success
    }

    /// The emulation's extended-backend enumeration: a fixed set of tuned variants, the split-K
    /// ones demanding one output image of workspace. Variants whose demand exceeds the budget are
    /// not returned, the way a heuristic query honors its workspace limit.
    fn lt_candidates(
        &mut self,
        shape: &GemmShape,
        workspace_bytes: usize,
    ) -> Result<Vec<AlgoDesc>, ProfError> {
        let split_k_ws = shape.ldc * shape.n * shape.dtype.c.size();
        let variants = [
            LtTuning { tile_id: 16, reduction_scheme: 0, swizzle: 0, custom_option: 0, workspace_size: 0, wave_count: 1.0 },
            LtTuning { tile_id: 18, reduction_scheme: 0, swizzle: 1, custom_option: 0, workspace_size: 0, wave_count: 1.5 },
            LtTuning { tile_id: 18, reduction_scheme: 1, swizzle: 0, custom_option: 0, workspace_size: split_k_ws, wave_count: 2.0 },
            LtTuning { tile_id: 20, reduction_scheme: 3, swizzle: 1, custom_option: 1, workspace_size: split_k_ws, wave_count: 2.5 },
        ];
        Ok(variants
            .into_iter()
            .enumerate()
            .filter(|(_, t)| t.workspace_size <= workspace_bytes)
            .map(|(id, tuning)| AlgoDesc { id: AlgoId(id as i32), tuning: Some(tuning) })
            .collect())
    }
}
