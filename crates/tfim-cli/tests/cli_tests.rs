//! CLI command parsing and helper tests.

// ============================================================================
// Configuration layering
// ============================================================================

mod config_layering {
    use tfim_cli::commands::common::{apply_flags, load_config};
    use tfim_runtime::SweepConfig;

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "backend: ibmq_lima\ndry_run: false\n").unwrap();

        let config = load_config(Some(&path), Some("ibmq_quito"), true, false).unwrap();
        assert_eq!(config.backend.as_deref(), Some("ibmq_quito"));
        assert!(config.dry_run);
        assert!(!config.continue_on_error);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "backend: ibmq_lima\ncontinue_on_error: true\n").unwrap();

        let loaded = SweepConfig::from_file(&path).unwrap();
        let config = apply_flags(loaded, None, false, false).unwrap();
        assert_eq!(config.backend.as_deref(), Some("ibmq_lima"));
        assert!(config.continue_on_error);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "shots: 0\n").unwrap();
        assert!(load_config(Some(&path), None, false, false).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(load_config(Some(&path), None, false, false).is_err());
    }

    #[test]
    fn test_flags_cannot_switch_off() {
        let config = SweepConfig {
            dry_run: true,
            continue_on_error: true,
            ..SweepConfig::default()
        };
        let config = apply_flags(config, None, false, false).unwrap();
        assert!(config.dry_run);
        assert!(config.continue_on_error);
    }

    #[test]
    fn test_flags_revalidate() {
        let config = SweepConfig {
            num_qubits: 1,
            ..SweepConfig::default()
        };
        assert!(apply_flags(config, Some("ibmq_quito"), true, false).is_err());
    }

    #[test]
    fn test_default_field_list() {
        let config = apply_flags(SweepConfig::default(), None, false, false).unwrap();
        let sweep = config.field_sweep().unwrap();
        assert_eq!(sweep.len(), 11);
        for h in [0.75, 1.25, 1.5, 2.0] {
            assert!(sweep.values().contains(&h), "missing {h}");
        }
    }
}

// ============================================================================
// Dry-run sweep, as driven by the sweep command
// ============================================================================

mod dry_run {
    use tfim_runtime::{LocalRuntime, RuntimeService, SweepConfig, SweepDriver};

    #[tokio::test]
    async fn test_dry_run_submits_every_field() {
        let service: Box<dyn RuntimeService> = Box::new(LocalRuntime::new());
        let config = SweepConfig {
            dry_run: true,
            ..SweepConfig::default()
        };
        let sweep = config.field_sweep().unwrap();

        let driver = SweepDriver::resolve(service.as_ref(), &config)
            .await
            .unwrap();
        let mut lines = Vec::new();
        let report = driver
            .run(&sweep, |record| {
                lines.push(format!("{:.4} {}", record.h, record.job_id().unwrap()));
            })
            .await
            .unwrap();

        assert_eq!(report.submitted(), 11);
        assert_eq!(lines.len(), 11);
        assert!(lines.iter().all(|l| l.contains("dry-run-")));
    }

    #[tokio::test]
    async fn test_payload_is_json_object() {
        let service = LocalRuntime::new();
        let config = SweepConfig::default();
        let driver = SweepDriver::new(&service, &config, "local_5q").unwrap();

        let payload = driver.inputs_for(0.75).unwrap().to_json().unwrap();
        let text = serde_json::to_string_pretty(&payload).unwrap();
        assert!(text.contains("\"operator\""));
        assert!(text.contains("\"x_mag\""));
        assert!(text.contains("OPENQASM 3.0"));
    }
}

// ============================================================================
// Hamiltonian output
// ============================================================================

mod hamiltonian_output {
    use tfim_ops::IsingParams;
    use tfim_ops::operator::DEFAULT_ATOL;

    #[test]
    fn test_simplified_terms() {
        let op = IsingParams::new(1.0)
            .with_bias(0.1)
            .with_coupling(1.0)
            .build(4)
            .unwrap();
        assert_eq!(op.num_terms(), 12);

        let simplified = op.simplify(DEFAULT_ATOL);
        assert_eq!(simplified.num_terms(), 12);
        let list = simplified.to_list();
        assert!(list.iter().any(|(l, c)| l == "ZZII" && (*c + 1.0).abs() < 1e-12));
        assert!(list.iter().any(|(l, c)| l == "IIIZ" && (*c + 0.1).abs() < 1e-12));
    }

    #[test]
    fn test_zero_bias_drops_after_simplify() {
        let op = IsingParams::new(0.5).build(3).unwrap();
        assert_eq!(op.num_terms(), 9);
        assert_eq!(op.simplify(DEFAULT_ATOL).num_terms(), 6);
    }

    #[test]
    fn test_too_few_qubits() {
        assert!(IsingParams::new(1.0).build(1).is_err());
    }
}

// ============================================================================
// Clap argument parsing
// ============================================================================

mod clap_parsing {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use tfim_cli::{Cli, Commands};

    #[test]
    fn test_command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sweep_minimal() {
        let cli = Cli::try_parse_from(["tfim-sweep", "sweep"]).unwrap();
        match cli.command {
            Commands::Sweep {
                config,
                backend,
                dry_run,
                continue_on_error,
                print_payload,
            } => {
                assert!(config.is_none());
                assert!(backend.is_none());
                assert!(!dry_run);
                assert!(!continue_on_error);
                assert!(!print_payload);
            }
            _ => panic!("Expected Sweep command"),
        }
    }

    #[test]
    fn test_parse_sweep_with_all_args() {
        let cli = Cli::try_parse_from([
            "tfim-sweep",
            "sweep",
            "-c",
            "sweep.yaml",
            "--backend",
            "ibmq_quito",
            "--dry-run",
            "--continue-on-error",
            "--print-payload",
        ])
        .unwrap();
        match cli.command {
            Commands::Sweep {
                config,
                backend,
                dry_run,
                continue_on_error,
                print_payload,
            } => {
                assert_eq!(config, Some(PathBuf::from("sweep.yaml")));
                assert_eq!(backend.as_deref(), Some("ibmq_quito"));
                assert!(dry_run);
                assert!(continue_on_error);
                assert!(print_payload);
            }
            _ => panic!("Expected Sweep command"),
        }
    }

    #[test]
    fn test_parse_backends_qubits() {
        let cli = Cli::try_parse_from(["tfim-sweep", "backends", "-q", "7"]).unwrap();
        match cli.command {
            Commands::Backends { qubits, any_width } => {
                assert_eq!(qubits, Some(7));
                assert!(!any_width);
            }
            _ => panic!("Expected Backends command"),
        }
    }

    #[test]
    fn test_parse_backends_conflict() {
        let result =
            Cli::try_parse_from(["tfim-sweep", "backends", "-q", "5", "--any-width"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_hamiltonian_defaults() {
        let cli = Cli::try_parse_from(["tfim-sweep", "hamiltonian", "--h", "1.5"]).unwrap();
        match cli.command {
            Commands::Hamiltonian {
                h,
                qubits,
                h_bias,
                coupling,
                format,
            } => {
                assert_eq!(h, 1.5);
                assert_eq!(qubits, 4);
                assert_eq!(h_bias, 0.1);
                assert_eq!(coupling, 1.0);
                assert_eq!(format, "table");
            }
            _ => panic!("Expected Hamiltonian command"),
        }
    }

    #[test]
    fn test_parse_hamiltonian_negative_values() {
        let cli = Cli::try_parse_from([
            "tfim-sweep",
            "hamiltonian",
            "--h",
            "-0.5",
            "--coupling",
            "-1",
            "-f",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Hamiltonian {
                h, coupling, format, ..
            } => {
                assert_eq!(h, -0.5);
                assert_eq!(coupling, -1.0);
                assert_eq!(format, "json");
            }
            _ => panic!("Expected Hamiltonian command"),
        }
    }

    #[test]
    fn test_parse_hamiltonian_missing_field() {
        let result = Cli::try_parse_from(["tfim-sweep", "hamiltonian"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["tfim-sweep", "status", "c7q9k2"]).unwrap();
        match cli.command {
            Commands::Status { job_id } => assert_eq!(job_id, "c7q9k2"),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_parse_status_missing_job_id() {
        let result = Cli::try_parse_from(["tfim-sweep", "status"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_fields_and_version() {
        let cli = Cli::try_parse_from(["tfim-sweep", "fields"]).unwrap();
        assert!(matches!(cli.command, Commands::Fields { config: None }));
        let cli = Cli::try_parse_from(["tfim-sweep", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_verbose_flag() {
        let cli = Cli::try_parse_from(["tfim-sweep", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["tfim-sweep", "fields", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_no_subcommand() {
        assert!(Cli::try_parse_from(["tfim-sweep"]).is_err());
        assert!(Cli::try_parse_from(["tfim-sweep", "foobar"]).is_err());
    }
}
