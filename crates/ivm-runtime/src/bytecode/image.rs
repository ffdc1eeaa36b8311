//! JSON program images
//!
//! A host-side convenience for handing programs to the engine:
//!
//! ```json
//! {
//!   "globals": 0,
//!   "functions": [{ "name": "main", "args": 0, "locals": 0, "address": 0 }],
//!   "code": ["iconst", 1, "iconst", 2, "iadd", "print", "halt"]
//! }
//! ```
//!
//! Code words are integers or opcode mnemonics; a mnemonic is only a
//! spelling of its word value, so `"iadd"` and `1` are interchangeable.

use super::{Opcode, Program};
use crate::function::FunctionMeta;
use crate::vm::dispatch::decode_instruction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Program image decoding errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid program image: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown mnemonic '{mnemonic}' at word {offset}")]
    UnknownMnemonic { mnemonic: String, offset: usize },

    #[error("program image declares no functions")]
    NoFunctions,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramImage {
    #[serde(default)]
    globals: usize,
    functions: Vec<FunctionMeta>,
    code: Vec<CodeWord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum CodeWord {
    Word(i32),
    Mnemonic(String),
}

impl Program {
    /// Parse a JSON program image
    pub fn from_json(source: &str) -> Result<Self, ImageError> {
        let image: ProgramImage = serde_json::from_str(source)?;
        if image.functions.is_empty() {
            return Err(ImageError::NoFunctions);
        }

        let code = image
            .code
            .into_iter()
            .enumerate()
            .map(|(offset, word)| match word {
                CodeWord::Word(word) => Ok(word),
                CodeWord::Mnemonic(mnemonic) => Opcode::from_name(&mnemonic)
                    .map(|op| op as i32)
                    .ok_or(ImageError::UnknownMnemonic { mnemonic, offset }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Program::new(code, image.globals, image.functions))
    }

    /// Render as a JSON program image, spelling opcodes by mnemonic
    pub fn to_json(&self) -> Result<String, ImageError> {
        let mut code = Vec::with_capacity(self.code.len());
        let mut offset = 0;
        while offset < self.code.len() {
            match decode_instruction(&self.code, offset) {
                Ok(instruction) => {
                    code.push(CodeWord::Mnemonic(instruction.opcode.name().to_string()));
                    code.extend(instruction.operands().iter().map(|w| CodeWord::Word(*w)));
                    offset = instruction.next_ip();
                }
                Err(_) => {
                    code.push(CodeWord::Word(self.code[offset]));
                    offset += 1;
                }
            }
        }

        let image = ProgramImage {
            globals: self.n_globals,
            functions: self.functions.iter().cloned().collect(),
            code,
        };
        Ok(serde_json::to_string_pretty(&image)?)
    }
}
