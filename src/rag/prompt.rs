//! Grounded prompt construction

use super::DocumentChunk;

const TEMPLATE: &str = "\
You are a friendly and expert technical assistant for MkDocs.

Guidelines:
1. Answer the question using ONLY the provided Context.
2. If the answer requires code, strictly use the code examples from the context.
3. If the context contains multiple related pieces of info, synthesize them.
4. Be concise and professional.

Context:
{context}

Question:
{question}
";

/// Chunk contents separated by blank lines, in retrieval order
pub fn join_context(docs: &[DocumentChunk]) -> String {
    docs.iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill the template with the context and the raw question
pub fn build_prompt(context: &str, question: &str) -> String {
    // Single pass so braces inside the context are never re-substituted
    let (head, rest) = TEMPLATE.split_once("{context}").unwrap_or((TEMPLATE, ""));
    let (middle, tail) = rest.split_once("{question}").unwrap_or((rest, ""));

    let mut prompt = String::with_capacity(TEMPLATE.len() + context.len() + question.len());
    prompt.push_str(head);
    prompt.push_str(context);
    prompt.push_str(middle);
    prompt.push_str(question);
    prompt.push_str(tail);
    prompt
}
