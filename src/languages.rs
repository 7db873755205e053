// CLASSIFICATION: COMMUNITY
// Filename: languages.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Read-only language metadata consulted when laying out a request.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: &'static str,
    pub name: &'static str,
    /// Editor highlighting mode.
    pub monaco: &'static str,
    /// The first entry names the input file.
    pub extensions: &'static [&'static str],
    pub alias: &'static [&'static str],
    pub formatter: Option<&'static str>,
    pub example: &'static str,
    pub monaco_disassembly: Option<&'static str>,
}

impl Language {
    /// Input file name for a request in this language.
    pub fn source_filename(&self) -> String {
        format!("example{}", self.extensions.first().copied().unwrap_or(".txt"))
    }
}

static LANGUAGES: Lazy<BTreeMap<&'static str, Language>> = Lazy::new(|| {
    [
        Language {
            id: "c",
            name: "C",
            monaco: "nc",
            extensions: &[".c", ".h"],
            alias: &[],
            formatter: Some("clangformat"),
            example: "int square(int num) {\n    return num * num;\n}\n",
            monaco_disassembly: None,
        },
        Language {
            id: "c++",
            name: "C++",
            monaco: "cppp",
            extensions: &[".cpp", ".cxx", ".h", ".hpp", ".hxx", ".c", ".cc", ".ixx"],
            alias: &["gcc", "cpp"],
            formatter: Some("clangformat"),
            example: "int square(int num) {\n    return num * num;\n}\n",
            monaco_disassembly: None,
        },
        Language {
            id: "cuda",
            name: "CUDA C++",
            monaco: "cuda",
            extensions: &[".cu"],
            alias: &["nvcc"],
            formatter: None,
            example: "__global__ void square(int *array, int n) {\n    int tid = blockDim.x * blockIdx.x + threadIdx.x;\n    if (tid < n)\n        array[tid] = array[tid] * array[tid];\n}\n",
            monaco_disassembly: Some("ptx"),
        },
        Language {
            id: "rust",
            name: "Rust",
            monaco: "rust",
            extensions: &[".rs"],
            alias: &[],
            formatter: Some("rustfmt"),
            example: "pub fn square(num: i32) -> i32 {\n    num * num\n}\n",
            monaco_disassembly: None,
        },
        Language {
            id: "assembly",
            name: "Assembly",
            monaco: "asm",
            extensions: &[".asm", ".6502", ".s"],
            alias: &["asm"],
            formatter: None,
            example: "square:\n    imul edi, edi\n    mov eax, edi\n    ret\n",
            monaco_disassembly: None,
        },
        Language {
            id: "llvm",
            name: "LLVM IR",
            monaco: "llvm-ir",
            extensions: &[".ll"],
            alias: &[],
            formatter: None,
            example: "define i32 @square(i32 %num) {\n  %1 = mul nsw i32 %num, %num\n  ret i32 %1\n}\n",
            monaco_disassembly: None,
        },
    ]
    .into_iter()
    .map(|lang| (lang.id, lang))
    .collect()
});

/// Look a language up by id or alias.
pub fn lookup(key: &str) -> Option<&'static Language> {
    LANGUAGES
        .get(key)
        .or_else(|| LANGUAGES.values().find(|l| l.alias.contains(&key)))
}

/// All known languages, ordered by id.
pub fn all() -> impl Iterator<Item = &'static Language> {
    LANGUAGES.values()
}

/// Guess the language of a file from its extension.
pub fn detect_language(path: &Path) -> Option<&'static Language> {
    let ext = path.extension().and_then(|s| s.to_str())?.to_lowercase();
    let dotted = format!(".{ext}");
    // Primary extensions win over secondary ones (".c" is C, not C++).
    all()
        .find(|l| l.extensions.first() == Some(&dotted.as_str()))
        .or_else(|| all().find(|l| l.extensions.contains(&dotted.as_str())))
}
