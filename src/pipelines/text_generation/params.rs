use candle_transformers::generation::Sampling;

/// User overrides for generation parameters.
/// All fields are optional - only set fields will override model defaults.
#[derive(Debug, Clone, Default)]
pub(crate) struct GenerationOverrides {
    pub temperature: Option<f64>,
    pub repeat_penalty: Option<f32>,
    pub repeat_last_n: Option<usize>,
    pub seed: Option<u64>,
    pub max_length: Option<usize>,
    pub top_p: Option<f64>,
    pub top_k: Option<usize>,
}

impl GenerationOverrides {
    /// Fill in anything the caller did not set from the model's defaults.
    pub(crate) fn resolve(&self, defaults: GenerationParams) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            repeat_penalty: self.repeat_penalty.unwrap_or(defaults.repeat_penalty),
            repeat_last_n: self.repeat_last_n.unwrap_or(defaults.repeat_last_n),
            seed: self.seed.unwrap_or(defaults.seed),
            max_length: self.max_length.unwrap_or(defaults.max_length),
            top_p: self.top_p.or(defaults.top_p),
            top_k: self.top_k.or(defaults.top_k),
        }
    }
}

/// Resolved parameters controlling text generation sampling behavior.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Randomness of sampling. 0.0 = greedy decoding, higher = more random.
    pub temperature: f64,
    /// Penalty for repeating tokens. 1.0 = no penalty, higher = less repetition.
    pub repeat_penalty: f32,
    /// Number of recent tokens to consider for repeat penalty.
    pub repeat_last_n: usize,
    /// Random seed for reproducible sampling.
    pub seed: u64,
    /// Maximum total sequence length in tokens, prompt included.
    pub max_length: usize,
    /// Nucleus sampling: only consider tokens with cumulative probability <= p.
    pub top_p: Option<f64>,
    /// Only consider the top k most likely tokens.
    pub top_k: Option<usize>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            repeat_penalty: 1.0,
            repeat_last_n: 64,
            seed: rand::random(),
            max_length: 256,
            top_p: None,
            top_k: None,
        }
    }
}

impl GenerationParams {
    pub(crate) fn sampling_strategy(&self) -> Sampling {
        if self.temperature <= 0.0 {
            return Sampling::ArgMax;
        }

        let temperature = self.temperature.max(1e-7);
        let top_k = self.top_k.unwrap_or(0);
        let top_p = self.top_p.unwrap_or(1.0);

        match (top_k > 0, top_p < 1.0) {
            (true, true) => Sampling::TopKThenTopP {
                k: top_k,
                p: top_p,
                temperature,
            },
            (true, false) => Sampling::TopK {
                k: top_k,
                temperature,
            },
            (false, true) => Sampling::TopP {
                p: top_p,
                temperature,
            },
            (false, false) => Sampling::All { temperature },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_temperature_is_greedy() {
        let params = GenerationParams::default();
        assert!(matches!(params.sampling_strategy(), Sampling::ArgMax));
    }

    #[test]
    fn sampling_strategy_combines_top_filters() {
        let mut params = GenerationParams {
            temperature: 0.7,
            ..GenerationParams::default()
        };
        assert!(matches!(
            params.sampling_strategy(),
            Sampling::All { .. }
        ));

        params.top_k = Some(40);
        assert!(matches!(params.sampling_strategy(), Sampling::TopK { k: 40, .. }));

        params.top_p = Some(0.9);
        assert!(matches!(
            params.sampling_strategy(),
            Sampling::TopKThenTopP { k: 40, .. }
        ));

        params.top_k = None;
        assert!(matches!(params.sampling_strategy(), Sampling::TopP { .. }));
    }

    #[test]
    fn overrides_take_precedence_over_defaults() {
        let overrides = GenerationOverrides {
            temperature: Some(0.8),
            max_length: Some(60),
            ..GenerationOverrides::default()
        };

        let resolved = overrides.resolve(GenerationParams::default());
        assert_eq!(resolved.temperature, 0.8);
        assert_eq!(resolved.max_length, 60);
        assert_eq!(resolved.repeat_penalty, 1.0);
    }
}
