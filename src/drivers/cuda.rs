//! NVIDIA CUDA execution target.
//!
//! Device plumbing (context, stream, events, buffers) goes through the [`cust`][1] crate; the
//! compute backend itself is cuBLAS, reached through a minimal hand-rolled binding to
//! `cublasGemmEx`. Timing uses a pair of CUDA events recorded on the same stream the backend
//! works on, synchronized before the elapsed time is read.
//!
//! [1]: https://crates.io/crates/cust

use crate::algo::AlgoDesc;
use crate::drivers::{DeviceBuf, ExecStatus, Operands, Target};
use crate::error::ProfError;
use crate::types::{self, GemmShape};

use cust::context::{Context, ContextFlags};
use cust::device::{Device, DeviceAttribute};
use cust::event::{Event, EventFlags};
use cust::memory::{CopyDestination, DeviceBuffer};
use cust::stream::{Stream, StreamFlags};
use cust::CudaFlags;

use std::ffi::c_void;
use std::ptr;

#[allow(non_camel_case_types)]
mod ffi {
    use std::ffi::c_void;

    pub type cublasHandle_t = *mut c_void;

    pub const CUBLAS_STATUS_SUCCESS: i32 = 0;
    pub const CUBLAS_STATUS_INVALID_VALUE: i32 = 7;
    pub const CUBLAS_STATUS_NOT_SUPPORTED: i32 = 15;

    pub const CUBLAS_OP_N: i32 = 0;
    pub const CUBLAS_OP_T: i32 = 1;

    extern "C" {
        pub fn cublasCreate_v2(handle: *mut cublasHandle_t) -> i32;
        pub fn cublasDestroy_v2(handle: cublasHandle_t) -> i32;
        pub fn cublasSetStream_v2(handle: cublasHandle_t, stream: *mut c_void) -> i32;
        #[allow(clippy::too_many_arguments)]
        pub fn cublasGemmEx(
            handle: cublasHandle_t,
            transa: i32,
            transb: i32,
            m: i32,
            n: i32,
            k: i32,
            alpha: *const c_void,
            a: *const c_void,
            atype: i32,
            lda: i32,
            b: *const c_void,
            btype: i32,
            ldb: i32,
            beta: *const c_void,
            c: *mut c_void,
            ctype: i32,
            ldc: i32,
            compute_type: i32,
            algo: i32,
        ) -> i32;
    }
}

/// Owned cuBLAS handle, destroyed on drop.
struct CublasHandle {
    raw: ffi::cublasHandle_t,
}

impl CublasHandle {
    fn new() -> Result<Self, ProfError> {
        let mut raw = ptr::null_mut();
        let status = unsafe { ffi::cublasCreate_v2(&mut raw) };
        if status != ffi::CUBLAS_STATUS_SUCCESS {
            return Err(ProfError::Backend(format!("cublasCreate failed with status {status}")));
        }
        Ok(Self { raw })
    }
}

impl Drop for CublasHandle {
    fn drop(&mut self) {
        unsafe {
            ffi::cublasDestroy_v2(self.raw);
        }
    }
}

impl DeviceBuf for DeviceBuffer<u8> {
    fn size(&self) -> usize {
        self.len()
    }

    fn device_addr(&self) -> usize {
        self.as_device_ptr().as_raw() as usize
    }
}

/// CUDA-backed [`Target`] implementation profiling cuBLAS.
pub struct CudaTarget {
    // Keeps the primary context alive for the lifetime of the target.
    _context: Context,
    stream: Stream,
    start: Event,
    stop: Event,
    handle: CublasHandle,
    name: String,
    cc_major: i32,
}

fn device_err(err: cust::error::CudaError) -> ProfError {
    ProfError::Device(err.to_string())
}

impl CudaTarget {
    /// Initializes the driver, binds the given device and creates the stream, events and cuBLAS
    /// handle the sweep uses.
    pub fn new(device_id: u32) -> Result<Self, ProfError> {
        cust::init(CudaFlags::empty()).map_err(device_err)?;
        let device = Device::get_device(device_id).map_err(device_err)?;
        let name = device.name().map_err(device_err)?;
        let cc_major = device
            .get_attribute(DeviceAttribute::ComputeCapabilityMajor)
            .map_err(device_err)?;
        let context = Context::create_and_push(ContextFlags::MAP_HOST | ContextFlags::SCHED_AUTO, device)
            .map_err(device_err)?;
        let stream = Stream::new(StreamFlags::NON_BLOCKING, None).map_err(device_err)?;
        let start = Event::new(EventFlags::DEFAULT).map_err(device_err)?;
        let stop = Event::new(EventFlags::DEFAULT).map_err(device_err)?;

        let handle = CublasHandle::new()?;
        let status = unsafe { ffi::cublasSetStream_v2(handle.raw, stream.as_inner() as *mut c_void) };
        if status != ffi::CUBLAS_STATUS_SUCCESS {
            return Err(ProfError::Backend(format!(
                "cublasSetStream failed with status {status}"
            )));
        }

        Ok(Self {
            _context: context,
            stream,
            start,
            stop,
            handle,
            name,
            cc_major,
        })
    }
}

impl Target for CudaTarget {
    type Buffer = DeviceBuffer<u8>;

    fn name(&self) -> &str {
        &self.name
    }

    // Tensor-op algorithms exist from compute capability 7 (Volta) on.
    fn tensor_op_capable(&self) -> bool {
        self.cc_major > 6
    }

    fn alloc(&mut self, bytes: usize) -> Result<DeviceBuffer<u8>, ProfError> {
        DeviceBuffer::zeroed(bytes).map_err(device_err)
    }

    fn upload(&mut self, buf: &mut DeviceBuffer<u8>, bytes: &[u8]) -> Result<(), ProfError> {
        buf.copy_from(bytes).map_err(device_err)
    }

    fn download(&mut self, buf: &DeviceBuffer<u8>) -> Result<Vec<u8>, ProfError> {
        let mut host = vec![0u8; buf.len()];
        buf.copy_to(&mut host[..]).map_err(device_err)?;
        Ok(host)
    }

    fn zero(&mut self, buf: &mut DeviceBuffer<u8>) -> Result<(), ProfError> {
        let zeros = vec![0u8; buf.len()];
        buf.copy_from(&zeros[..]).map_err(device_err)
    }

    fn timer_start(&mut self) -> Result<(), ProfError> {
        self.start.record(&self.stream).map_err(device_err)
    }

    fn timer_stop(&mut self) -> Result<f32, ProfError> {
        self.stop.record(&self.stream).map_err(device_err)?;
        self.stop.synchronize().map_err(device_err)?;
        self.stop.elapsed_time_f32(&self.start).map_err(device_err)
    }

    fn gemm(
        &mut self,
        shape: &GemmShape,
        ops: &mut Operands<DeviceBuffer<u8>>,
        algo: &AlgoDesc,
    ) -> ExecStatus {
        let dtype = &shape.dtype;
        let alpha = types::one_bytes(dtype.compute);
        let beta = types::zero_bytes(dtype.compute);
        let op = |trans: bool| if trans { ffi::CUBLAS_OP_T } else { ffi::CUBLAS_OP_N };

        let status = unsafe {
            ffi::cublasGemmEx(
                self.handle.raw,
                op(shape.transa),
                op(shape.transb),
                shape.m as i32,
                shape.n as i32,
                shape.k as i32,
                alpha.as_ptr() as *const c_void,
                ops.a.device_addr() as *const c_void,
                dtype.a.backend_id(),
                shape.lda as i32,
                ops.b.device_addr() as *const c_void,
                dtype.b.backend_id(),
                shape.ldb as i32,
                beta.as_ptr() as *const c_void,
                ops.c.device_addr() as *mut c_void,
                dtype.c.backend_id(),
                shape.ldc as i32,
                dtype.compute.backend_id(),
                algo.id.0,
            )
        };

        match status {
            ffi::CUBLAS_STATUS_SUCCESS => ExecStatus::Success,
            ffi::CUBLAS_STATUS_NOT_SUPPORTED => ExecStatus::NotSupported,
            ffi::CUBLAS_STATUS_INVALID_VALUE => ExecStatus::InvalidValue,
            other => ExecStatus::Fatal(format!("cublasGemmEx returned status {other}")),
        }
    }
}
