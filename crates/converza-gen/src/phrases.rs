pub const AGENTS: &[&str] = &[
    "Sarah Johnson",
    "Michael Chen",
    "Emily Rodriguez",
    "David Smith",
    "Lisa Thompson",
    "Robert Wilson",
    "Jennifer Davis",
    "James Brown",
    "Maria Garcia",
    "Christopher Lee",
    "Amanda White",
    "Kevin Martinez",
];

pub const CONVERSION: &[&str] = &[
    "Yes, I'll book that appointment",
    "Sign me up for that",
    "Let's proceed with the purchase",
    "I'd like to move forward",
    "That sounds perfect, let's do it",
    "I'm ready to buy",
    "Count me in",
    "I'll take it",
    "Let's get started",
    "Perfect, I'm interested",
];

pub const UPSELL: &[&str] = &[
    "I'll take the premium package for an extra $50",
    "Add the extended warranty for $25",
    "Include the premium support for $75",
    "I'll upgrade to the deluxe version for $100",
    "Add the insurance package for $30",
    "Include the installation service for $45",
    "I want the premium features for $60",
    "Add the express delivery for $15",
    "Include the maintenance plan for $80",
    "Upgrade to professional tier for $120",
];

pub const POSITIVE: &[&str] = &[
    "This is fantastic",
    "Super helpful",
    "Excellent service",
    "I'm very satisfied",
    "Outstanding support",
    "Really impressed",
    "Great experience",
    "Wonderful product",
    "Amazing quality",
    "Highly recommend this",
];

pub const NEGATIVE: &[&str] = &[
    "I'm very frustrated",
    "This is unacceptable",
    "Poor customer service",
    "Very disappointed",
    "Terrible experience",
    "Not happy at all",
    "This is ridiculous",
    "Completely unsatisfied",
    "Waste of time",
    "Very unprofessional",
];

pub const OPENERS: &[&str] = &[
    "Hello, I'm calling about",
    "I have some questions",
    "Can you help me with",
    "I'm looking into",
    "I need information about",
    "Could you explain",
    "I'm considering",
    "What are the options for",
    "I'd like to know more about",
    "Can you tell me about",
];

/// Small talk with no sentiment keywords or buying signals.
pub const FILLER: &[&str] = &[
    "The account was opened last spring.",
    "Our office uses the standard plan right now.",
    "Delivery usually takes about a week.",
    "The invoice lists two separate items.",
    "Most customers call during the morning.",
    "I checked the order number on the receipt.",
    "The manual covers the setup steps.",
    "We have three people on the team.",
    "The model number is printed on the back.",
    "Billing happens at the start of each month.",
    "The branch near me closes at six.",
    "Our contract renews in the autumn.",
];
