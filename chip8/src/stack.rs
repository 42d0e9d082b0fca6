//! Subroutine call stack.
use crate::{
    constants::Address,
    error::{Chip8Error, Chip8Result},
};

/// Stack of return addresses used for jumping when a routine call finishes.
///
/// The RCA 1802 interpreter allowed 12 levels of nesting.
/// There is no practical reason to keep that limit, so the stack grows
/// as needed.
#[derive(Debug, Default, Clone)]
pub struct CallStack {
    frames: Vec<Address>,
}

impl CallStack {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn push(&mut self, address: Address) {
        self.frames.push(address);
    }

    /// Pop the most recent return address.
    ///
    /// `caller` is the address of the `RET` instruction, reported
    /// in the error when the stack is empty.
    #[inline]
    pub fn pop(&mut self, caller: Address) -> Chip8Result<Address> {
        self.frames
            .pop()
            .ok_or(Chip8Error::StackUnderflow { address: caller })
    }

    pub fn peek(&self) -> Option<Address> {
        self.frames.last().copied()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lifo() {
        let mut stack = CallStack::new();
        stack.push(0x202);
        stack.push(0x304);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(), Some(0x304));

        assert_eq!(stack.pop(0x400), Ok(0x304));
        assert_eq!(stack.pop(0x400), Ok(0x202));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_underflow() {
        let mut stack = CallStack::new();
        assert_eq!(
            stack.pop(0x20A),
            Err(Chip8Error::StackUnderflow { address: 0x20A })
        );
    }
}
