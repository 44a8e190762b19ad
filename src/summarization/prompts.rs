//! Prompt templates sent to the generative model.

/// Prompt asking for a short summary of an extracted text excerpt.
pub fn text_summary_prompt(excerpt: &str) -> String {
    format!(
        "Analyze and summarize the following text content. Focus on:\n\
         1. Main topic/subject\n\
         2. Key points or important information\n\
         3. Document purpose or type\n\
         4. Most relevant details\n\
         \n\
         Keep the summary concise but informative (2-3 sentences max).\n\
         \n\
         Text content:\n\
         {excerpt}\n"
    )
}

/// Prompt asking a vision model to describe the image at `reference`.
pub fn image_analysis_prompt(reference: &str, content_type: &str) -> String {
    format!(
        "Analyze this image ({content_type}) from URL: {reference}\n\
         \n\
         Provide:\n\
         1. Main objects/subjects in the image\n\
         2. Scene description\n\
         3. Text content (if any)\n\
         4. Overall theme/category\n\
         5. Key visual elements\n\
         \n\
         Keep response concise and structured.\n"
    )
}
