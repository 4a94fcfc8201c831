pub use kbind::*;

extern "C" {
    #[link_name = "rust_helper_BUG"]
    pub fn BUG() -> !;

    #[link_name = "rust_helper_errname"]
    pub fn errname(err: core::ffi::c_int) -> *const core::ffi::c_char;

    // error
    #[link_name = "rust_helper_IS_ERR"]
    pub fn is_err(ptr: *const core::ffi::c_void) -> bool;
    #[link_name = "rust_helper_PTR_ERR"]
    pub fn ptr_err(ptr: *const core::ffi::c_void) -> core::ffi::c_long;
    // error end

    #[link_name = "rust_helper_spin_lock_init"]
    pub fn spin_lock_init(
        lock: *mut spinlock_t,
        name: *const core::ffi::c_char,
        key: *mut lock_class_key,
    );
    #[link_name = "rust_helper_spin_lock"]
    pub fn spin_lock(lock: *mut spinlock_t);
    #[link_name = "rust_helper_spin_unlock"]
    pub fn spin_unlock(lock: *mut spinlock_t);

    // proc
    #[link_name = "rust_helper_pde_data"]
    pub fn pde_data(inode: *const inode) -> *mut core::ffi::c_void;
    // proc end

    // idr
    #[link_name = "rust_helper_idr_init"]
    pub fn idr_init(idr: *mut idr);
    #[link_name = "rust_helper_idr_preload_end"]
    pub fn idr_preload_end();
    // idr end
}
