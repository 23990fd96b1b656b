//! Closed value sets for enum parameters and the product identity

crate::define_choice_enum! {
    /// Bedrock foundation model the gateway invokes
    BedrockModel {
        ClaudeSonnet45 => "anthropic.claude-sonnet-4-5-v2" : "Claude Sonnet 4.5" | "sonnet-4.5",
        ClaudeOpus45 => "anthropic.claude-opus-4-5-v2" : "Claude Opus 4.5" | "opus-4.5",
        ClaudeSonnet35 => "anthropic.claude-3-5-sonnet-20241022-v2:0" : "Claude 3.5 Sonnet v2" | "sonnet-3.5",
    }
}

impl Default for BedrockModel {
    /// Lowest-cost variant
    fn default() -> Self {
        Self::ClaudeSonnet45
    }
}

crate::define_choice_enum! {
    /// EC2 instance size for the gateway host
    InstanceSize {
        T3Micro => "t3.micro" : "t3.micro (1 GiB, Free Tier)",
        T3Small => "t3.small" : "t3.small (2 GiB)",
        T3Medium => "t3.medium" : "t3.medium (4 GiB)",
    }
}

impl InstanceSize {
    /// On-demand Linux price in us-east-1, USD per hour
    pub fn on_demand_hourly_rate(&self) -> f64 {
        match self {
            Self::T3Micro => 0.0104,
            Self::T3Small => 0.0208,
            Self::T3Medium => 0.0416,
        }
    }
}

impl Default for InstanceSize {
    fn default() -> Self {
        Self::T3Micro
    }
}

crate::define_choice_enum! {
    /// Gateway product deployed on the host
    Product {
        Clawdbot => "clawdbot" : "Clawdbot",
        Moltbot => "moltbot" : "Moltbot",
        OpenClaw => "openclaw" : "OpenClaw" | "open-claw",
    }
}

/// Outbound traffic allowed by the gateway security group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgressPolicy {
    AllowAll,
    HttpsOnly,
}

impl Product {
    /// Lower-case prefix used for SSM paths, log groups and resource names
    pub fn slug(&self) -> &'static str {
        self.value()
    }

    pub fn npm_package(&self) -> &'static str {
        self.value()
    }

    pub fn egress_policy(&self) -> EgressPolicy {
        match self {
            Self::Clawdbot | Self::Moltbot => EgressPolicy::AllowAll,
            Self::OpenClaw => EgressPolicy::HttpsOnly,
        }
    }

    /// CloudFormation stack name used when deploying the template
    pub fn stack_name(&self) -> String {
        format!("{}Stack", self.name())
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::OpenClaw
    }
}
