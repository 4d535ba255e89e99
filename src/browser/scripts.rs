//! Functions evaluated inside the page
//!
//! Each script runs as the body of a WebDriver `execute` call, so its
//! arguments arrive in `arguments` and its result is whatever it returns.
//! Structural parsing happens in Rust over a snapshot; in-page code is kept to
//! what only the live document can do (reading state and clicking).

use serde::Deserialize;

const READY_STATE_JS: &str = "return document.readyState;";

const SNAPSHOT_JS: &str = "return document.documentElement.outerHTML;";

const HAS_ELEMENT_JS: &str = "return document.querySelector(arguments[0]) !== null;";

const REVEAL_JS: &str = r#"
const [blockSelector, toggleSelector] = arguments;
const blocks = Array.from(document.querySelectorAll(blockSelector));
const failed = [];
blocks.forEach((block, index) => {
  try {
    const toggle = block.querySelector(toggleSelector);
    if (toggle === null) {
      failed.push(index);
      return;
    }
    toggle.click();
  } catch (e) {
    failed.push(index);
  }
});
return { blocks: blocks.length, failed: failed };
"#;

const REVEAL_SETTLED_JS: &str = r#"
const [blockSelector, codeSelector] = arguments;
const blocks = Array.from(document.querySelectorAll(blockSelector));
return blocks.every((block) => {
  const code = block.querySelector(codeSelector);
  return code !== null && code.textContent.trim().length > 0;
});
"#;

/// An in-page function the core asks a session to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageScript {
    /// Returns `document.readyState`
    ReadyState,

    /// Returns the rendered document's outer HTML
    Snapshot,

    /// `[selector]` → whether any element matches
    HasElement,

    /// `[block selector, toggle selector]` → clicks every block's toggle,
    /// returning a [`RevealReport`]
    Reveal,

    /// `[block selector, code selector]` → whether every block shows code
    RevealSettled,
}

impl PageScript {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadyState => "ready-state",
            Self::Snapshot => "snapshot",
            Self::HasElement => "has-element",
            Self::Reveal => "reveal",
            Self::RevealSettled => "reveal-settled",
        }
    }

    /// JavaScript source run in the page
    pub fn source(&self) -> &'static str {
        match self {
            Self::ReadyState => READY_STATE_JS,
            Self::Snapshot => SNAPSHOT_JS,
            Self::HasElement => HAS_ELEMENT_JS,
            Self::Reveal => REVEAL_JS,
            Self::RevealSettled => REVEAL_SETTLED_JS,
        }
    }
}

/// Result of [`PageScript::Reveal`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RevealReport {
    /// Number of component blocks found
    pub blocks: usize,

    /// Indices of blocks whose toggle was missing or threw
    #[serde(default)]
    pub failed: Vec<usize>,
}
