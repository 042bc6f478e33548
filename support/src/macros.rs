/// Tell the runtime that a library contains a proc-block.
///
/// This generates the two entrypoints a host looks up when it loads the
/// compiled proc-block: one returning its [`Metadata`] and one constructing
/// a new node from a list of [`Argument`]s. Both make sure logging has been
/// initialized first.
///
/// [`Metadata`]: crate::guest::Metadata
/// [`Argument`]: crate::guest::Argument
#[macro_export]
macro_rules! export_proc_block {
    (metadata: $metadata_func:expr, proc_block: $proc_block:ty $(,)?) => {
        #[doc(hidden)]
        #[no_mangle]
        pub fn __proc_block_metadata() -> $crate::guest::Metadata {
            $crate::guest::initialize_logger();
            $metadata_func()
        }

        #[doc(hidden)]
        #[no_mangle]
        pub fn __proc_block_new(
            args: Vec<$crate::guest::Argument>,
        ) -> Result<Box<dyn $crate::guest::ProcBlock>, $crate::guest::CreateError> {
            fn assert_impl_proc_block(_: &impl $crate::guest::ProcBlock) {}

            $crate::guest::initialize_logger();

            let proc_block = <$proc_block>::try_from(args)?;
            assert_impl_proc_block(&proc_block);

            Ok(Box::new(proc_block) as Box<dyn $crate::guest::ProcBlock>)
        }
    };
}
