//! Builtin Reference Data
//!
//! The closed lists that bound every classification output. Values are
//! matched verbatim by the pipeline, so casing here is canonical:
//! concern events and misc topics are stored lowercase, emerging risks
//! in title case, exactly as they appear in the store's flat fields.

/// Concern events observed in crawled articles
pub const CONCERN_EVENTS: &[&str] = &[
    "injuries",
    "fatalities",
    "property damage",
    "lawsuits",
    "product recall",
    "explosion",
    "fire",
    "chemical spill",
    "water damage",
    "structural collapse",
    "data breach",
    "environmental contamination",
    "regulatory violation",
    "workplace accident",
    "vehicle collision",
    "business interruption",
    "equipment failure",
    "flooding",
    "power outage",
    "supply chain disruption",
    "fraud",
    "theft",
    "vandalism",
    "evacuation",
    "bankruptcy",
    "labor dispute",
    "food contamination",
    "medical malpractice",
];

/// Emerging risk categories tracked by the analysts
pub const EMERGING_RISKS: &[&str] = &[
    "Climate Change",
    "PFAS",
    "Ransomware",
    "Microplastics",
    "Artificial Intelligence Liability",
    "Cyber Warfare",
    "Lithium-Ion Battery Fires",
    "Extreme Heat",
    "Wildfire Spread",
    "Sea Level Rise",
    "Supply Chain Concentration",
    "Gig Economy Exposure",
    "Autonomous Vehicles",
    "Drone Operations",
    "Crypto Asset Volatility",
    "Deepfake Fraud",
    "Antibiotic Resistance",
    "Pandemic Preparedness",
    "Space Debris",
    "Grid Instability",
    "Nanomaterials",
    "Social Inflation",
    "Biometric Privacy",
    "Carbon Capture Technology",
    "Hydrogen Infrastructure",
    "Permafrost Thaw",
];

/// Miscellaneous insurance topics (small list, always embedded in full)
pub const MISC_TOPICS: &[&str] = &[
    "home ownership",
    "personal auto",
    "commercial property",
    "workers compensation",
    "general liability",
    "professional liability",
    "marine cargo",
    "crop insurance",
    "renters insurance",
    "small business",
    "life and health",
    "reinsurance",
];

/// NAICS industry codes with their official descriptions
pub const NAICS_TABLE: &[(&str, &str)] = &[
    ("112111", "Beef Cattle Ranching and Farming"),
    ("211120", "Crude Petroleum Extraction"),
    ("221122", "Electric Power Distribution"),
    ("236220", "Commercial and Institutional Building Construction"),
    ("311611", "Animal (except Poultry) Slaughtering"),
    ("325180", "Other Basic Inorganic Chemical Manufacturing"),
    ("327910", "Abrasive Product Manufacturing"),
    ("445110", "Supermarkets and Other Grocery Retailers"),
    ("481111", "Scheduled Passenger Air Transportation"),
    ("484121", "General Freight Trucking, Long-Distance, Truckload"),
    ("492110", "Couriers and Express Delivery Services"),
    ("518210", "Computing Infrastructure Providers, Data Processing, Web Hosting, and Related Services"),
    ("531110", "Lessors of Residential Buildings and Dwellings"),
    ("611110", "Elementary and Secondary Schools"),
    ("622110", "General Medical and Surgical Hospitals"),
    ("721110", "Hotels (except Casino Hotels) and Motels"),
];
