// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Two-cursor alignment of pseudocode text to source lines. Pseudocode
//! arrives one logical statement per line, so the alignment is near-1:1
//! after skipping the source lines that carry no statement: blanks,
//! comments, docstrings, and the continuation lines of bracketed
//! multi-line statements.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One (source line, pseudocode line) correspondence, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LinePair {
    pub source_line: u32,
    pub pseudocode_line: u32,
}

/// Align `pseudocode` to `source` and return the pairs in source order.
///
/// Docstrings are tracked with a delimiter state machine; a line opening a
/// triple-quoted string either closes it on the same line (two delimiter
/// occurrences) or consumes every following line until the closing
/// delimiter. Multi-line statements are detected by bracket-depth
/// accounting and their whole span maps to one pseudocode line.
pub fn align(source: &str, pseudocode: &str) -> Vec<LinePair> {
    if source.is_empty() || pseudocode.is_empty() {
        return Vec::new();
    }

    let source_lines: Vec<&str> = source.split('\n').collect();
    let pseudo_lines: Vec<&str> = pseudocode.split('\n').collect();

    let mut pairs = Vec::new();
    let mut pseudo_index = 0usize;

    let mut in_multi_line = false;
    let mut span_start = 0usize;
    let mut span_opens = 0usize;
    let mut span_closes = 0usize;
    let mut in_docstring = false;
    let mut delimiter = "\"\"\"";

    for (source_index, raw_line) in source_lines.iter().enumerate() {
        let line = raw_line.trim();

        if in_docstring {
            if line.contains(delimiter) {
                in_docstring = false;
            }
            continue;
        }
        if line.starts_with("\"\"\"") || line.starts_with("'''") {
            delimiter = if line.starts_with("\"\"\"") { "\"\"\"" } else { "'''" };
            // two occurrences on one line close it immediately
            in_docstring = line.matches(delimiter).count() < 2;
            continue;
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let opens = count_chars(line, ['(', '[', '{']);
        let closes = count_chars(line, [')', ']', '}']);

        if !in_multi_line && opens > closes {
            in_multi_line = true;
            span_start = source_index;
            span_opens = 0;
            span_closes = 0;
        }

        if in_multi_line {
            span_opens += opens;
            span_closes += closes;
            if span_opens == span_closes {
                in_multi_line = false;
                skip_blank(&pseudo_lines, &mut pseudo_index);
                if pseudo_index < pseudo_lines.len() {
                    for i in span_start..=source_index {
                        let span_line = source_lines[i].trim();
                        if !span_line.is_empty() && !span_line.starts_with('#') {
                            pairs.push(LinePair {
                                source_line: i as u32 + 1,
                                pseudocode_line: pseudo_index as u32 + 1,
                            });
                        }
                    }
                    pseudo_index += 1;
                }
            }
            continue;
        }

        skip_blank(&pseudo_lines, &mut pseudo_index);
        if pseudo_index < pseudo_lines.len() {
            pairs.push(LinePair {
                source_line: source_index as u32 + 1,
                pseudocode_line: pseudo_index as u32 + 1,
            });
            pseudo_index += 1;
        }
    }

    pairs
}

fn count_chars(line: &str, set: [char; 3]) -> usize {
    line.chars().filter(|ch| set.contains(ch)).count()
}

fn skip_blank(lines: &[&str], index: &mut usize) {
    while *index < lines.len() && lines[*index].trim().is_empty() {
        *index += 1;
    }
}
