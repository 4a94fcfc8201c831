use std::{env, path::PathBuf};

const INCLUDED_TYPES: &[&str] = &[
    "proc_ops",
    "proc_dir_entry",
    "seq_file",
    "file",
    "inode",
    "idr",
    "spinlock_t",
    "lock_class_key",
    "module",
    "umode_t",
    "loff_t",
];
const INCLUDED_FUNCTIONS: &[&str] = &[
    "krealloc",
    "kfree",
    "vzalloc",
    "vfree",
    "_copy_from_user",
    "_printk",
    "proc_create_data",
    "proc_remove",
    "seq_read",
    "seq_lseek",
    "seq_write",
    "single_open",
    "single_release",
    "idr_alloc",
    "idr_remove",
    "idr_replace",
    "idr_get_next",
    "idr_destroy",
    "idr_preload",
];
const INCLUDED_VARS: &[&str] = &[
    "EPERM",
    "ENOENT",
    "EINTR",
    "EIO",
    "E2BIG",
    "EBADF",
    "EAGAIN",
    "ENOMEM",
    "EACCES",
    "EFAULT",
    "EBUSY",
    "EEXIST",
    "ENODEV",
    "EINVAL",
    "ENOSPC",
    "ESPIPE",
    "ERANGE",
    "ENOTSUPP",
    "MAX_ERRNO",
    "__this_module",
    "BINDINGS_GFP_KERNEL",
    "BINDINGS_GFP_NOWAIT",
    "BINDINGS_S_IRUSR",
    "BINDINGS_S_IWUSR",
    "KERN_EMERG",
    "KERN_ALERT",
    "KERN_CRIT",
    "KERN_ERR",
    "KERN_WARNING",
    "KERN_NOTICE",
    "KERN_INFO",
    "KERN_DEBUG",
    "KERN_CONT",
];
const OPAQUE_TYPES: &[&str] = &[
    // These need to be opaque because they're both packed and aligned, which rustc
    // doesn't support yet. See https://github.com/rust-lang/rust/issues/59154
    // and https://github.com/rust-lang/rust-bindgen/issues/1538
    "desc_struct",
    "xregs_state",
    "alt_instr",
];

// Takes the CFLAGS from the kernel Makefile and changes all the include paths to be absolute
// instead of relative.
fn prepare_cflags(cflags: &str, kernel_dir: &str) -> Vec<String> {
    let cflag_parts = shlex::split(cflags).expect("malformed c_flags");
    let mut cflag_iter = cflag_parts.iter();
    let mut kernel_args = vec![];
    while let Some(arg) = cflag_iter.next() {
        if arg.starts_with("-I") && !arg.starts_with("-I/") {
            kernel_args.push(format!("-I{}/{}", kernel_dir, &arg[2..]));
        } else if arg == "-include" {
            kernel_args.push(arg.to_string());
            let include_path = cflag_iter.next().expect("-include without a path");
            if include_path.starts_with('/') {
                kernel_args.push(include_path.to_string());
            } else {
                kernel_args.push(format!("{}/{}", kernel_dir, include_path));
            }
        } else {
            kernel_args.push(arg.to_string());
        }
    }
    kernel_args
}

// Flags gcc accepts but clang rejects when the kernel was configured for gcc.
const CLANG_INCOMPATIBLE_FLAGS: &[(&str, &str)] = &[
    ("-mfunction-return=thunk-extern", ""),
    ("-fzero-call-used-regs=used-gpr", ""),
    ("-fconserve-stack", ""),
    ("-mrecord-mcount", ""),
    ("-Wno-maybe-uninitialized", "-Wno-uninitialized"),
    ("-Wno-alloc-size-larger-than", ""),
    ("-Wimplicit-fallthrough=5", "-Wimplicit-fallthrough"),
];

fn main() {
    println!("cargo:rerun-if-env-changed=CC");
    println!("cargo:rerun-if-env-changed=KDIR");
    println!("cargo:rerun-if-env-changed=c_flags");

    let Ok(kernel_dir) = env::var("KDIR") else {
        return;
    };
    let mut kernel_cflags = env::var("c_flags").expect("Add 'export c_flags' to Kbuild");
    for (from, to) in CLANG_INCOMPATIBLE_FLAGS {
        kernel_cflags = kernel_cflags.replace(from, to);
    }

    let kbuild_cflags_module =
        env::var("KBUILD_CFLAGS_MODULE").expect("Must be invoked from kernel makefile");

    let cflags = format!("{} {}", kernel_cflags, kbuild_cflags_module);
    let kernel_args = prepare_cflags(&cflags, &kernel_dir);

    let target = env::var("TARGET").expect("cargo sets TARGET for build scripts");

    let mut builder = bindgen::Builder::default()
        .use_core()
        .ctypes_prefix("core::ffi")
        .derive_default(true)
        .size_t_is_usize(true)
        .layout_tests(false)
        .enable_function_attribute_detection();

    builder = builder.clang_arg(format!("--target={}", target));
    for arg in kernel_args.iter() {
        builder = builder.clang_arg(arg.clone());
    }

    println!("cargo:rerun-if-changed=src/bindings_helper.h");
    builder = builder.header("src/bindings_helper.h");

    for t in INCLUDED_TYPES {
        builder = builder.allowlist_type(t);
    }
    for f in INCLUDED_FUNCTIONS {
        builder = builder.allowlist_function(f);
    }
    for v in INCLUDED_VARS {
        builder = builder.allowlist_var(v);
    }
    for t in OPAQUE_TYPES {
        builder = builder.opaque_type(t);
    }
    let bindings = builder.generate().expect("Unable to generate bindings");

    let out_path = PathBuf::from("src");
    bindings
        .write_to_file(out_path.join("bindings_c.rs"))
        .expect("Couldn't write bindings!");

    let mut builder = cc::Build::new();
    builder.compiler(env::var("CC").unwrap_or_else(|_| "clang".to_string()));
    builder.target(&target);
    builder.warnings(false);
    println!("cargo:rerun-if-changed=src/helpers.c");
    builder.file("src/helpers.c");
    for arg in kernel_args.iter() {
        builder.flag(arg);
    }
    builder.remove_flag("-pg");
    builder.compile("helpers");
}
