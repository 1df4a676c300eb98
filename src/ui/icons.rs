pub struct Icons;

impl Icons {
    pub const CONCEPT: &str = "🧩";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const LINK: &str = "🔗";
    pub const INBOUND: &str = "⬅️";
    pub const PARENT: &str = "⬆️";
    pub const DATABASE: &str = "🗄️";
    pub const FIELD: &str = "▪️";
}
