//! Building, compiling and summarising the benchmarked networks.

use densebench::benchmarks::{BenchmarkConfig, ReferenceNetwork};
use densebench::network::{random_normal, rng_from_seed};
use densebench::{Activation, Architecture, InstructionModel, InstructionModelInfo};

const DELTA: f32 = 1e-4;

fn build(layers_size: [usize; 3], seed: u64) -> densebench::Sequential {
    Architecture::from_layers_size(&layers_size)
        .expect("valid architecture")
        .sequential_config(1, Activation::Tanh, Activation::Tanh)
        .build("test", &mut rng_from_seed(Some(seed)))
        .expect("network should build")
}

#[test]
fn every_default_model_compiles_and_predicts() {
    let config = BenchmarkConfig::default();
    let mut rng = rng_from_seed(Some(5));

    for name in config.sweep_order() {
        let architecture = config.architecture(&name).expect("known model");
        let network = architecture
            .sequential_config(1, Activation::Tanh, Activation::Tanh)
            .build(&name, &mut rng)
            .expect("network should build");

        assert_eq!(network.layers().len(), architecture.hidden_depth + 1);
        assert_eq!(Some(network.param_count()), architecture.param_count(1));

        let model = network.compile().expect("network should compile");
        assert_eq!(model.get_output_size(), architecture.output_width);

        let input = random_normal(1, &mut rng);
        let output = model.predict(&input).expect("prediction should succeed");
        assert_eq!(output.len(), architecture.output_width);
        assert!(output.iter().all(|v| v.is_finite() && v.abs() <= 1.0));
    }
}

#[test]
fn compiled_model_matches_reference() {
    let network = build([50, 175, 4], 21);
    let model = network.compile().expect("network should compile");
    let reference = ReferenceNetwork::from(&network);

    for input in [[-2.0f32], [0.0], [0.3], [1.7]] {
        let expected = reference.forward(&input);
        let actual = model.predict(&input).expect("prediction should succeed");
        for (e, a) in expected.iter().zip(&actual) {
            assert!((e - a).abs() < DELTA, "expected {}, got {}", e, a);
        }
    }
}

#[test]
fn same_seed_builds_same_network() {
    let a = build([10, 310, 2], 99).compile().unwrap();
    let b = build([10, 310, 2], 99).compile().unwrap();
    let c = build([10, 310, 2], 100).compile().unwrap();

    let out_a = a.predict(&[0.5]).unwrap();
    let out_b = b.predict(&[0.5]).unwrap();
    let out_c = c.predict(&[0.5]).unwrap();
    assert_eq!(out_a, out_b);
    assert_ne!(out_a, out_c);
}

#[test]
fn zero_input_gives_zero_output_with_zero_bias() {
    // tanh(0) = 0 and biases start at zero, so zeros propagate through every layer.
    let model = build([20, 180, 4], 3).compile().unwrap();
    let output = model.predict(&[0.0]).unwrap();
    assert!(output.iter().all(|v| *v == 0.0));
}

#[test]
fn summary_lists_every_layer() {
    let network = build([1, 315, 2], 1);
    let summary = network.summary();

    assert!(summary.contains("Model: \"test\""));
    assert!(summary.contains("input_layer (InputLayer)"));
    assert!(summary.contains("dense (Dense)"));
    assert!(summary.contains("dense_1 (Dense)"));
    assert!(summary.contains("dense_2 (Dense)"));
    assert!(!summary.contains("dense_3"));
    assert!(summary.contains("(None, 315)"));
    assert!(summary.contains("99,540"));
    assert!(summary.contains("Total params: 100,486"));
    assert!(summary.contains("Non-trainable params: 0"));
}

#[test]
fn exported_model_info_reloads() {
    let network = build([5, 64, 1], 8);
    let info = network.to_instruction_model_info();
    assert_eq!(info.computation_buffer_sizes, vec![1, 64, 5]);
    assert_eq!(info.parameter_count(), network.param_count());

    let json = serde_json::to_string(&info).expect("serialize");
    let reloaded: InstructionModelInfo = serde_json::from_str(&json).expect("deserialize");
    let model = InstructionModel::new(reloaded).expect("reloaded model should build");

    let original = network.compile().unwrap();
    let expected = original.predict(&[0.25]).unwrap();
    let actual = model.predict(&[0.25]).unwrap();
    for (e, a) in expected.iter().zip(&actual) {
        assert!((e - a).abs() < 1e-6);
    }
}
