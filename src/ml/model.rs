use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{gelu, tanh},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    #[config(default = 0.1)]
    pub dropout:     f64,
    #[config(default = 2)]
    pub num_labels:  usize,
}

impl ClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let pooler     = LinearConfig::new(self.d_model, self.d_model).init(device);
        let classifier = LinearConfig::new(self.d_model, self.num_labels).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        Classifier {
            token_embedding, position_embedding, layers,
            final_norm, pooler, classifier, dropout,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// `mask_pad` is true at padding positions.
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(mask_pad))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(gelu(self.ffn_linear1.forward(x.clone())));
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Transformer encoder with a mean-pooled sequence classification head.
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub pooler:             Linear<B>,
    pub classifier:         Linear<B>,
    pub dropout:            Dropout,
}

impl<B: Backend> Classifier<B> {
    /// input_ids, attention_mask: [batch, seq_len] → logits: [batch, num_labels]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, attention_mask: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mask_pad = attention_mask.clone().equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, mask_pad.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]
        let [_, _, d_model] = x.dims();

        // Mean over real tokens only.
        let mask    = attention_mask.float();
        let weights = mask.clone()
            .reshape([batch_size, seq_len, 1])
            .expand([batch_size, seq_len, d_model]);
        let summed  = (x * weights).sum_dim(1).reshape([batch_size, d_model]);
        let counts  = mask.sum_dim(1).clamp_min(1.0).expand([batch_size, d_model]);
        let pooled  = tanh(self.pooler.forward(summed / counts));

        self.classifier.forward(self.dropout.forward(pooled))
    }

    /// Cross-entropy loss against class indices, plus the logits.
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        labels:         Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(input_ids, attention_mask);
        let loss   = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels);
        (loss, logits)
    }

    /// Compare loaded parameter shapes with `config`; `load_record` does not.
    pub fn check_shapes(&self, config: &ClassifierConfig) -> anyhow::Result<()> {
        if self.layers.len() != config.num_layers {
            anyhow::bail!(
                "weights have {} encoder layers, config expects {}",
                self.layers.len(), config.num_layers,
            );
        }

        let mut expected = vec![
            ("token_embedding",    self.token_embedding.weight.val().dims(),    [config.vocab_size, config.d_model]),
            ("position_embedding", self.position_embedding.weight.val().dims(), [config.max_seq_len, config.d_model]),
            ("pooler",             self.pooler.weight.val().dims(),             [config.d_model, config.d_model]),
            ("classifier",         self.classifier.weight.val().dims(),         [config.d_model, config.num_labels]),
        ];
        for layer in &self.layers {
            expected.push(("ffn_linear1", layer.ffn_linear1.weight.val().dims(), [config.d_model, config.d_ff]));
        }

        for (name, actual, wanted) in expected {
            if actual != wanted {
                anyhow::bail!("{name} weights have shape {actual:?}, config expects {wanted:?}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::backend::{default_device, InferBackend};

    fn tiny() -> ClassifierConfig {
        ClassifierConfig::new(20, 8, 16, 2, 1, 32).with_dropout(0.0)
    }

    #[test]
    fn test_forward_shape() {
        let device = default_device();
        let model: Classifier<InferBackend> = tiny().init(&device);

        let ids  = Tensor::<InferBackend, 2, Int>::from_data(TensorData::new(vec![3i64, 4, 5, 0, 6, 7, 0, 0], [2, 4]), &device);
        let mask = Tensor::<InferBackend, 2, Int>::from_data(TensorData::new(vec![1i64, 1, 1, 0, 1, 1, 0, 0], [2, 4]), &device);

        let logits = model.forward(ids, mask);
        assert_eq!(logits.dims(), [2, 2]);
    }

    #[test]
    fn test_forward_loss_is_finite() {
        let device = default_device();
        let model: Classifier<InferBackend> = tiny().init(&device);

        let ids    = Tensor::<InferBackend, 2, Int>::from_data(TensorData::new(vec![3i64, 4, 5], [1, 3]), &device);
        let mask   = Tensor::<InferBackend, 2, Int>::ones([1, 3], &device);
        let labels = Tensor::<InferBackend, 1, Int>::from_data(TensorData::new(vec![1i64], [1]), &device);

        let (loss, _) = model.forward_loss(ids, mask, labels);
        let loss: f64 = loss.into_scalar().elem::<f64>();
        assert!(loss.is_finite());
    }

    #[test]
    fn test_padding_does_not_change_prediction() {
        let device = default_device();
        let model: Classifier<InferBackend> = tiny().init(&device);

        let short      = Tensor::<InferBackend, 2, Int>::from_data(TensorData::new(vec![3i64, 4], [1, 2]), &device);
        let short_mask = Tensor::<InferBackend, 2, Int>::ones([1, 2], &device);
        let padded     = Tensor::<InferBackend, 2, Int>::from_data(TensorData::new(vec![3i64, 4, 0, 0], [1, 4]), &device);
        let pad_mask   = Tensor::<InferBackend, 2, Int>::from_data(TensorData::new(vec![1i64, 1, 0, 0], [1, 4]), &device);

        let a: Vec<f32> = model.forward(short, short_mask).into_data().convert::<f32>().to_vec().unwrap();
        let b: Vec<f32> = model.forward(padded, pad_mask).into_data().convert::<f32>().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "{x} vs {y}");
        }
    }

    #[test]
    fn test_check_shapes_accepts_own_config() {
        let model: Classifier<InferBackend> = tiny().init(&default_device());
        assert!(model.check_shapes(&tiny()).is_ok());
    }

    #[test]
    fn test_check_shapes_rejects_other_vocab() {
        let model: Classifier<InferBackend> = tiny().init(&default_device());
        let bigger = ClassifierConfig::new(35, 8, 16, 2, 1, 32);
        let err = model.check_shapes(&bigger).unwrap_err();
        assert!(err.to_string().contains("token_embedding"), "{err}");
    }

    #[test]
    fn test_check_shapes_rejects_layer_count() {
        let model: Classifier<InferBackend> = tiny().init(&default_device());
        let deeper = ClassifierConfig::new(20, 8, 16, 2, 2, 32);
        assert!(model.check_shapes(&deeper).is_err());
    }
}
