use std::collections::VecDeque;
use std::sync::Mutex;

use super::types::{InlineImage, LlmClient};
use super::LlmError;

/// Scripted client: replies are popped in order; every prompt is recorded.
/// Once the script runs out, the last reply repeats.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    prompts: Mutex<Vec<String>>,
    images: Mutex<Vec<InlineImage>>,
    fail: bool,
}

impl MockLlmClient {
    pub fn new(reply: &str) -> Self {
        Self::scripted(&[reply])
    }

    pub fn scripted(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            last: Mutex::new(String::new()),
            prompts: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Every call fails with an HTTP error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::scripted(&[])
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn images(&self) -> Vec<InlineImage> {
        self.images.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn reply(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LlmError::HttpClient("mock failure".into()));
        }
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.reply(prompt)
    }

    fn generate_with_image(&self, prompt: &str, image: &InlineImage) -> Result<String, LlmError> {
        self.images.lock().unwrap().push(image.clone());
        self.reply(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_in_order_then_repeats_last() {
        let client = MockLlmClient::scripted(&["one", "two"]);
        assert_eq!(client.generate("a").unwrap(), "one");
        assert_eq!(client.generate("b").unwrap(), "two");
        assert_eq!(client.generate("c").unwrap(), "two");
        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failing_client_still_records_prompt() {
        let client = MockLlmClient::failing();
        assert!(client.generate("x").is_err());
        assert_eq!(client.call_count(), 1);
    }
}
