//! Post-processing pass list.
//!
//! The chain is built once at setup. Per frame only the glitch pass is
//! switched on or off; the render pass always stays first.

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    Render,
    Glitch,
}

#[derive(Clone, Debug)]
pub struct PostChain {
    passes: SmallVec<[PassKind; 2]>,
}

impl Default for PostChain {
    fn default() -> Self {
        Self::new()
    }
}

impl PostChain {
    pub fn new() -> Self {
        let mut passes = SmallVec::new();
        passes.push(PassKind::Render);
        Self { passes }
    }

    pub fn set_glitch(&mut self, enabled: bool) {
        let present = self.glitch_enabled();
        if enabled && !present {
            self.passes.push(PassKind::Glitch);
        } else if !enabled && present {
            self.passes.retain(|p| *p != PassKind::Glitch);
        }
    }

    #[inline]
    pub fn glitch_enabled(&self) -> bool {
        self.passes.contains(&PassKind::Glitch)
    }

    #[inline]
    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pass_always_first() {
        let mut chain = PostChain::new();
        assert_eq!(chain.passes(), &[PassKind::Render]);
        chain.set_glitch(true);
        chain.set_glitch(true);
        assert_eq!(chain.passes(), &[PassKind::Render, PassKind::Glitch]);
        chain.set_glitch(false);
        assert_eq!(chain.passes(), &[PassKind::Render]);
    }
}
