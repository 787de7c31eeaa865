//! Instruction prompts sent to the model

/// Triage of the tail of `pungi.global.log`.
///
/// The model is told to say so explicitly when Koji logs have to be read;
/// the escalator keys off that wording.
pub const GLOBAL_LOG_TRIAGE: &str = "Analyze this `pungi.global.log`. Is the root cause a high-level \
compose issue (repo, disk space) OR a lower-level image build failure? If it's a build failure, \
you MUST state that deeper Koji log analysis is needed.";

/// Final synthesis over a Koji task's `compose-status.json`
pub const KOJI_STATUS_SYNTHESIS: &str = r#"You are an expert Fedora build engineer. Based on this definitive `compose-status.json` from a Koji build task, provide a final diagnosis and a numbered list of recommended actions.

**Your Analysis Rules:**
1.  **Prioritize Tracebacks:** A `FileNotFoundError` inside a Python traceback is the most likely root cause. It indicates a missing package dependency in the build root.
2.  **Identify Missing Executables:** If you see a `FileNotFoundError` for a specific command (e.g., `FileNotFoundError: [Errno 2] No such file or directory: 'usermod'`), you MUST identify the Fedora package that provides that command (e.g., `usermod` is provided by the `shadow-utils` package) and state that this package is missing from the build dependencies.
3.  **Ignore Noise:** Disregard repetitive, non-fatal errors like "Read-only file system" for `/sys/fs/selinux/`, as they are symptoms of the build environment, not the root cause.
4.  **Be Directive:** Your recommended actions must be specific and actionable (e.g., "Add `shadow-utils` to the package set for this image build.")."#;

/// Default question for the `analyze` command
pub const DEFAULT_LOG_QUESTION: &str = "What went wrong? Please summarize the key points.";

/// Prompt for answering an operator's question about a saved run log
pub fn log_question_prompt(question: &str, log_content: &str) -> String {
    format!(
        r#"You are an expert DevOps engineer specializing in Fedora build systems.
Your task is to analyze the following log file from a Fedora IoT compose check and answer the user's question based on the log's content.

**User's Question:** {question}

**Log File Content:**
---
{log_content}
---

**Your Analysis:**
Provide a clear, concise answer in markdown format. If you find a specific error message, quote it in a code block.
Suggest the most likely root cause and recommend the next debugging steps in a numbered list.
"#
    )
}
