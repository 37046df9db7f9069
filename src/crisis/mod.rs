pub mod detector;
pub mod resources;

pub use detector::{CrisisDetector, CrisisPattern};
pub use resources::{CrisisResource, crisis_resources};

/// Returned in place of a model reply whenever crisis language is detected.
pub const SAFETY_MESSAGE: &str = r#"I'm really concerned about what you're sharing. It sounds like you're in a lot of pain right now, and I want you to know that your life matters.

However, I'm not equipped to provide emergency support. Please reach out for immediate help:

**Emergency Services:**
- India: 112 (Emergency) or 1800-599-0019 (Mental Health Helpline - 24/7)
- International: Your local emergency number

**Crisis Resources:**
- National Suicide Prevention Helpline (India): 1800-599-0019 (24/7)
- Please also reach out to a trusted friend, family member, or mental health professional right now.

You don't have to face this alone. There are people who care and want to help."#;
