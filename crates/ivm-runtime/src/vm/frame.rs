//! Call frame implementation for function calls

use crate::error::RuntimeError;
use crate::function::FunctionMeta;
use std::sync::Arc;

/// Activation record of one in-flight function call
///
/// Frames are singly linked through `caller`; the chain reachable from the
/// VM's active frame is the call stack. Each frame owns its caller, so
/// popping a frame on RET hands ownership of the caller back to the VM.
///
/// ## Layout
///
/// ```text
/// factorial(3) called from factorial(4) called from main:
///
/// active -> [factorial | n=3] -> [factorial | n=4] -> [main] -> None
/// ```
///
/// Locals are `arg_count` argument slots followed by `local_count`
/// zero-initialized slots.
#[derive(Debug)]
pub struct CallFrame {
    /// Frame that executed the CALL (None for the entry frame)
    caller: Option<Box<CallFrame>>,
    /// Instruction pointer to return to after the function completes
    return_ip: usize,
    /// Descriptor of the executing function
    function: Arc<FunctionMeta>,
    /// Arguments then locals
    locals: Box<[i32]>,
}

impl CallFrame {
    /// Build a frame for `function`, copying `args` into the first slots
    ///
    /// `args` holds the top `arg_count` stack values, bottom-most first, so
    /// argument 0 is the value pushed first.
    pub fn new(
        caller: Option<Box<CallFrame>>,
        return_ip: usize,
        function: Arc<FunctionMeta>,
        args: &[i32],
    ) -> Self {
        let mut locals = vec![0; function.frame_size()].into_boxed_slice();
        let n = args.len().min(function.arg_count);
        locals[..n].copy_from_slice(&args[..n]);

        Self {
            caller,
            return_ip,
            function,
            locals,
        }
    }

    /// Read local slot `index`; `ip` is reported on fault
    pub fn load(&self, index: i32, ip: usize) -> Result<i32, RuntimeError> {
        let slot = self.slot(index, ip)?;
        Ok(self.locals[slot])
    }

    /// Write local slot `index`; `ip` is reported on fault
    pub fn store(&mut self, index: i32, value: i32, ip: usize) -> Result<(), RuntimeError> {
        let slot = self.slot(index, ip)?;
        self.locals[slot] = value;
        Ok(())
    }

    fn slot(&self, index: i32, ip: usize) -> Result<usize, RuntimeError> {
        usize::try_from(index)
            .ok()
            .filter(|slot| *slot < self.locals.len())
            .ok_or_else(|| RuntimeError::LocalOutOfBounds {
                index,
                len: self.locals.len(),
                function: self.function.name.clone(),
                ip,
            })
    }

    /// Pop this frame, yielding its caller
    pub fn into_caller(mut self) -> Option<Box<CallFrame>> {
        self.caller.take()
    }

    pub fn caller(&self) -> Option<&CallFrame> {
        self.caller.as_deref()
    }

    pub fn return_ip(&self) -> usize {
        self.return_ip
    }

    pub fn function(&self) -> &FunctionMeta {
        &self.function
    }

    pub fn locals(&self) -> &[i32] {
        &self.locals
    }

    /// Iterate from this frame out to the entry frame
    pub fn chain(&self) -> impl Iterator<Item = &CallFrame> {
        std::iter::successors(Some(self), |frame| frame.caller())
    }
}

impl Drop for CallFrame {
    // Unlink iteratively so deep call chains do not recurse on drop.
    fn drop(&mut self) {
        let mut caller = self.caller.take();
        while let Some(mut frame) = caller {
            caller = frame.caller.take();
        }
    }
}

/// Function names from the entry frame inward
pub(crate) fn chain_names(frame: Option<&CallFrame>) -> Vec<&str> {
    let mut names: Vec<&str> = frame
        .map(|f| f.chain().map(|f| f.function().name.as_str()).collect())
        .unwrap_or_default();
    names.reverse();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, args: usize, locals: usize) -> Arc<FunctionMeta> {
        Arc::new(FunctionMeta::new(name, args, locals, 0))
    }

    #[test]
    fn test_new_frame_copies_args_and_zeroes_locals() {
        let frame = CallFrame::new(None, 7, meta("f", 2, 3), &[10, 20]);

        assert_eq!(frame.locals(), &[10, 20, 0, 0, 0]);
        assert_eq!(frame.return_ip(), 7);
        assert!(frame.caller().is_none());
    }

    #[test]
    fn test_load_store_in_bounds() {
        let mut frame = CallFrame::new(None, 0, meta("f", 1, 1), &[5]);
        frame.store(1, 42, 0).unwrap();

        assert_eq!(frame.load(0, 0).unwrap(), 5);
        assert_eq!(frame.load(1, 0).unwrap(), 42);
    }

    #[test]
    fn test_load_out_of_bounds() {
        let frame = CallFrame::new(None, 0, meta("f", 1, 1), &[5]);

        match frame.load(2, 9) {
            Err(RuntimeError::LocalOutOfBounds {
                index,
                len,
                function,
                ip,
            }) => {
                assert_eq!((index, len, function.as_str(), ip), (2, 2, "f", 9));
            }
            other => panic!("expected LocalOutOfBounds, got {:?}", other),
        }
        assert!(frame.load(-1, 0).is_err());
    }

    #[test]
    fn test_store_out_of_bounds_on_empty_frame() {
        let mut frame = CallFrame::new(None, 0, meta("main", 0, 0), &[]);
        assert!(frame.store(0, 1, 3).is_err());
    }

    #[test]
    fn test_chain_and_pop() {
        let main = CallFrame::new(None, 0, meta("main", 0, 0), &[]);
        let f = CallFrame::new(Some(Box::new(main)), 4, meta("f", 1, 0), &[1]);
        let g = CallFrame::new(Some(Box::new(f)), 11, meta("g", 0, 0), &[]);

        assert_eq!(chain_names(Some(&g)), vec!["main", "f", "g"]);

        let f = g.into_caller().unwrap();
        assert_eq!(f.function().name, "f");
        assert_eq!(f.return_ip(), 4);
        assert_eq!(chain_names(Some(&*f)), vec!["main", "f"]);
    }

    #[test]
    fn test_deep_chain_drops() {
        let mut frame = CallFrame::new(None, 0, meta("main", 0, 0), &[]);
        for i in 0..100_000 {
            frame = CallFrame::new(Some(Box::new(frame)), i, meta("r", 0, 0), &[]);
        }
        drop(frame);
    }
}
